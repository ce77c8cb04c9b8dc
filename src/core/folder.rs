//! Folders discovered in the legacy tree.

use std::path::{Path, PathBuf};

use crate::core::family::Family;

/// One compilable unit found directly inside an `objs` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFolder {
    /// Folder name, reused as the module name in the output.
    pub name: String,
    /// Location in the legacy tree.
    pub source: PathBuf,
    /// Family it was classified into.
    pub family: Family,
    /// Destination relative to the output root (`src/<family>/<name>`).
    pub destination: PathBuf,
}

/// One executable found directly inside an `apps` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppFolder {
    pub name: String,
    pub source: PathBuf,
    /// Destination relative to the output root (`apps/<name>.dir`).
    pub destination: PathBuf,
}

/// A header carrying the meta-object marker.
///
/// Each one needs a generated `<stem>.moc.cc` compiled next to the folder
/// it was relocated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MocHeader {
    /// Header file name, e.g. `CubeViewport.h`.
    pub header: String,
    /// Destination folder relative to the output root.
    pub destination: PathBuf,
}

impl MocHeader {
    pub fn new(header: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        MocHeader {
            header: header.into(),
            destination: destination.into(),
        }
    }

    /// Header name up to its first `.`.
    pub fn stem(&self) -> &str {
        self.header.split('.').next().unwrap_or_default()
    }

    /// Generated source, relative to `dir` (also root-relative).
    ///
    /// Returns `None` when the header was not relocated beneath `dir`.
    pub fn generated_source(&self, dir: &Path) -> Option<PathBuf> {
        let module = self.destination.strip_prefix(dir).ok()?;
        if module.as_os_str().is_empty() {
            return None;
        }
        Some(module.join(format!("{}.moc.cc", self.stem())))
    }
}
