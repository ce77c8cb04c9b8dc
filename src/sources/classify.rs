//! Classification of object folders into families.

use std::path::Path;

use anyhow::Result;

use crate::core::family::{descriptor_family, Family};
use crate::core::ReformatError;
use crate::util::fs::{file_name, glob_in};

/// Decide the destination family of an object folder.
///
/// Only descriptor files directly inside `folder` count. None means Core,
/// one names the family, and more than one is a fatal
/// [`ReformatError::AmbiguousFamily`].
pub fn classify(folder: &Path) -> Result<Family> {
    let descriptors: Vec<String> = glob_in(folder, "*.plugin")?
        .iter()
        .map(|p| file_name(p))
        .filter(|name| descriptor_family(name).is_some())
        .collect();

    match descriptors.as_slice() {
        [] => Ok(Family::Core),
        [single] => {
            let family = descriptor_family(single).unwrap_or_default();
            Ok(Family::named(family))
        }
        _ => Err(ReformatError::AmbiguousFamily {
            folder: folder.to_path_buf(),
            descriptors,
        }
        .into()),
    }
}
