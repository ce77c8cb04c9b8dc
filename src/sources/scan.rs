//! Descriptor scanning over the legacy tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::family::{descriptor_family, is_descriptor};

/// Every descriptor file under `root`, in traversal order.
///
/// Traversal visits entries sorted by name, so the order is stable between
/// runs on the same tree.
pub fn descriptor_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_descriptor(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Distinct plugin family names declared anywhere under `root`.
///
/// Core is never part of the result; callers add it explicitly.
pub fn scan_families(root: &Path) -> Result<BTreeSet<String>> {
    let mut families = BTreeSet::new();
    for path in descriptor_files(root)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match descriptor_family(&name) {
            Some(family) => {
                families.insert(family.to_string());
            }
            None => tracing::warn!("ignoring descriptor without a family name: {}", path.display()),
        }
    }
    tracing::debug!("discovered {} plugin families", families.len());
    Ok(families)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::LegacyTree;

    #[test]
    fn test_scan_families() {
        let tree = LegacyTree::new();
        tree.object("mro/objs/Hirise", &[("Camera.plugin", "A"), ("Hirise.cpp", "")])
            .object("lro/objs/Lronac", &[("Camera.plugin", "B")])
            .object("base/objs/Sinusoidal", &[("Projection.plugin", "")])
            .object("base/objs/Cube", &[("Cube.cpp", "")])
            .folder("qisis/objs/Tool", &[("Gui.plugin", "")])
            .folder("base/objs/Odd", &[(".plugin", "")]);

        let families = scan_families(&tree.src()).unwrap();
        let names: Vec<_> = families.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Camera", "Gui", "Projection"]);
    }

    #[test]
    fn test_descriptor_files_traversal_order() {
        let tree = LegacyTree::new();
        tree.object("b/objs/Two", &[("Camera.plugin", "")])
            .object("a/objs/One", &[("Camera.plugin", "")]);

        let files = descriptor_files(&tree.src()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/objs/One/Camera.plugin"));
        assert!(files[1].ends_with("b/objs/Two/Camera.plugin"));
    }
}
