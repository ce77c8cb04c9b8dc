//! Plugin families.
//!
//! A family groups interchangeable implementation folders. Membership is
//! declared by a descriptor file (`<Family>.plugin`) inside the folder;
//! folders without one belong to the Core library.

use std::fmt;

/// Suffix of descriptor files.
pub const DESCRIPTOR_SUFFIX: &str = ".plugin";

/// Directory name of the Core family.
pub const CORE_FAMILY: &str = "Core";

/// Destination family of an object folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    /// Folders without a descriptor; built into the single Core library.
    Core,
    /// A named plugin family.
    Plugin(String),
}

impl Family {
    /// Family declared under `name`; the Core name always means Core.
    pub fn named(name: &str) -> Self {
        if name == CORE_FAMILY {
            Family::Core
        } else {
            Family::Plugin(name.to_string())
        }
    }

    /// Name of the family directory under `<output>/src`.
    pub fn dir_name(&self) -> &str {
        match self {
            Family::Core => CORE_FAMILY,
            Family::Plugin(name) => name,
        }
    }

    pub fn is_core(&self) -> bool {
        matches!(self, Family::Core)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Check whether a file name is a descriptor file.
pub fn is_descriptor(file_name: &str) -> bool {
    file_name.ends_with(DESCRIPTOR_SUFFIX)
}

/// Family name declared by a descriptor file name.
///
/// The name is everything before the first `.`, so `Camera.plugin` and
/// `Camera.v2.plugin` both declare `Camera`. Returns `None` for names that
/// are not descriptors or whose prefix is empty.
pub fn descriptor_family(file_name: &str) -> Option<&str> {
    if !is_descriptor(file_name) {
        return None;
    }
    let name = file_name.split('.').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
