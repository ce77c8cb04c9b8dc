//! Output tree layout.
//!
//! ```text
//! <output>/
//!   src/<Family>/<module>/   relocated object folders
//!   src/Core/<module>/
//!   apps/<app>.dir/          relocated executables
//!   include/                 flattened headers
//!   extra/                   merged descriptors and data files
//! ```

use std::path::{Path, PathBuf};

use crate::core::family::Family;

/// Name of the fragment written into every generated directory.
pub const FRAGMENT_FILE: &str = "Makefile.am";

/// Suffix appended to relocated app folders.
pub const APP_DIR_SUFFIX: &str = ".dir";

/// Paths of the generated tree, rooted at the destination directory.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn family_dir(&self, family: &Family) -> PathBuf {
        self.src_dir().join(family.dir_name())
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.root.join("apps")
    }

    pub fn extra_dir(&self) -> PathBuf {
        self.root.join("extra")
    }

    /// Family directory relative to the root.
    pub fn family_rel(family: &Family) -> PathBuf {
        Path::new("src").join(family.dir_name())
    }

    /// Destination of an object folder, relative to the root.
    pub fn object_rel(family: &Family, folder: &str) -> PathBuf {
        Self::family_rel(family).join(folder)
    }

    /// Destination of an app folder, relative to the root.
    pub fn app_rel(app: &str) -> PathBuf {
        Path::new("apps").join(format!("{}{}", app, APP_DIR_SUFFIX))
    }

    /// Resolve a root-relative path.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }
}
