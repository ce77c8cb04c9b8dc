//! Legacy tree fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway legacy tree plus a sibling output location.
///
/// ```text
/// <tmp>/legacy/src/...   the tree being migrated
/// <tmp>/out              destination (not created)
/// ```
pub struct LegacyTree {
    dir: TempDir,
}

impl LegacyTree {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("legacy/src")).unwrap();
        LegacyTree { dir }
    }

    /// Root of the legacy tree.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("legacy")
    }

    /// The legacy `src` directory.
    pub fn src(&self) -> PathBuf {
        self.root().join("src")
    }

    /// Destination for generated output.
    pub fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Scratch directory next to the tree, for resources and archives.
    pub fn scratch(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Write a file relative to the legacy root.
    pub fn file(&self, rel: impl AsRef<Path>, contents: &str) -> &Self {
        write(&self.root().join(rel), contents);
        self
    }

    /// Create a folder under `src` holding the given files.
    ///
    /// `path` is relative to `src`, e.g. `base/objs/Cube`.
    pub fn folder(&self, path: &str, files: &[(&str, &str)]) -> &Self {
        let dir = self.src().join(path);
        fs::create_dir_all(&dir).unwrap();
        for (name, contents) in files {
            write(&dir.join(name), contents);
        }
        self
    }

    /// Alias of [`LegacyTree::folder`] for `objs` entries.
    pub fn object(&self, path: &str, files: &[(&str, &str)]) -> &Self {
        self.folder(path, files)
    }

    /// Alias of [`LegacyTree::folder`] for `apps` entries.
    pub fn app(&self, path: &str, files: &[(&str, &str)]) -> &Self {
        self.folder(path, files)
    }
}

impl Default for LegacyTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Header text carrying the meta-object marker.
pub fn qt_header(class: &str) -> String {
    format!(
        "#include <QWidget>\n\nclass {class} : public QWidget {{\n  Q_OBJECT\n\n public:\n  {class}();\n}};\n"
    )
}

/// Plain C++ source text.
pub fn cpp_source(class: &str) -> String {
    format!("#include \"{class}.h\"\n\n{class}::{class}() {{}}\n")
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
