//! Filesystem utilities.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::{glob, Pattern};
use walkdir::WalkDir;

/// File-name patterns excluded from a tree copy.
///
/// Patterns are matched against the bare name of every entry at every
/// level, so excluding a directory name skips everything beneath it.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    pub fn new(patterns: &[&str]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid ignore pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;
        Ok(IgnoreSet { patterns })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

/// Recursively copy a directory, skipping ignored names.
///
/// The destination must not exist yet; its parents are created. Returns
/// the number of files copied.
pub fn copy_dir_filtered(src: &Path, dst: &Path, ignore: &IgnoreSet) -> Result<usize> {
    if dst.exists() {
        bail!("destination already exists: {}", dst.display());
    }
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    copy_level(src, dst, ignore)
}

fn copy_level(src: &Path, dst: &Path, ignore: &IgnoreSet) -> Result<usize> {
    fs::create_dir(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    let mut entries = fs::read_dir(src)
        .with_context(|| format!("failed to read directory: {}", src.display()))?
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut copied = 0;
    for entry in entries {
        let name = entry.file_name();
        if ignore.matches(&name.to_string_lossy()) {
            continue;
        }

        let src_path = entry.path();
        let dst_path = dst.join(&name);

        if src_path.is_dir() {
            copied += copy_level(&src_path, &dst_path, ignore)?;
        } else {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Create a directory that must not exist yet.
pub fn create_new_dir(path: &Path) -> Result<()> {
    fs::create_dir(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Read a file as raw bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    write_bytes(path, contents.as_bytes())
}

/// Write bytes to a file, creating parent directories if needed.
pub fn write_bytes(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Append the bytes of `src` to `dst`, creating `dst` if needed.
pub fn append_file(src: &Path, dst: &Path) -> Result<()> {
    let mut input = fs::File::open(src)
        .with_context(|| format!("failed to open file: {}", src.display()))?;
    let mut output = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dst)
        .with_context(|| format!("failed to open file for append: {}", dst.display()))?;
    io::copy(&mut input, &mut output)
        .with_context(|| format!("failed to append {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Files directly inside `dir` matching a glob such as `*.cpp`, sorted.
pub fn glob_in(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let full_pattern = Path::new(&escaped).join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let mut results = Vec::new();
    for entry in glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Immediate subdirectories of `dir`, sorted by name.
pub fn subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Final path component as a string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Path rendered with `/` separators, as build files expect.
pub fn to_unix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative path from `base` to `path`, rendered with `/` separators.
pub fn relative_unix(base: &Path, path: &Path) -> String {
    to_unix(&relative_path(base, path))
}

/// Check line by line whether a file contains `marker`.
///
/// Stops at the first matching line. Lines need not be valid UTF-8.
pub fn file_contains(path: &Path, marker: &str) -> Result<bool> {
    let needle = marker.as_bytes();
    if needle.is_empty() {
        return Ok(false);
    }
    let file =
        fs::File::open(path).with_context(|| format!("failed to open file: {}", path.display()))?;
    for line in BufReader::new(file).split(b'\n') {
        let line = line.with_context(|| format!("failed to read file: {}", path.display()))?;
        if line.windows(needle.len()).any(|w| w == needle) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Remove directories under `root` that hold nothing, deepest first.
///
/// A directory whose only entries were themselves empty directories is
/// removed too. Paths in `keep` (and `root`) always survive. Returns the
/// number of directories removed.
pub fn prune_empty_dirs(root: &Path, keep: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(root).contents_first(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        if path == root || keep.iter().any(|k| k == path) {
            continue;
        }
        let is_empty = fs::read_dir(path)
            .with_context(|| format!("failed to read directory: {}", path.display()))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(path)
                .with_context(|| format!("failed to remove directory: {}", path.display()))?;
            tracing::debug!("pruned empty directory {}", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}

/// Create a symlink (platform-aware).
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_in_is_not_recursive() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("b.cpp"), "").unwrap();
        fs::write(tmp.path().join("a.cpp"), "").unwrap();
        fs::write(tmp.path().join("a.h"), "").unwrap();
        fs::write(tmp.path().join("nested/c.cpp"), "").unwrap();

        let files = glob_in(tmp.path(), "*.cpp").unwrap();
        let names: Vec<_> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.cpp", "b.cpp"]);
    }

    #[test]
    fn test_glob_in_escapes_directory() {
        let tmp = TempDir::new().unwrap();
        let odd = tmp.path().join("odd[1]");
        fs::create_dir_all(&odd).unwrap();
        fs::write(odd.join("x.proto"), "").unwrap();

        assert_eq!(glob_in(&odd, "*.proto").unwrap().len(), 1);
    }

    #[test]
    fn test_copy_dir_filtered() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("out/dst");
        fs::create_dir_all(src.join("tsts/case")).unwrap();
        fs::write(src.join("Foo.cpp"), "int x;").unwrap();
        fs::write(src.join("Foo.h"), "").unwrap();
        fs::write(src.join("Makefile"), "").unwrap();
        fs::write(src.join("tsts/case/Makefile"), "").unwrap();

        let ignore = IgnoreSet::new(&["Makefile", "tsts", "*.h"]).unwrap();
        let copied = copy_dir_filtered(&src, &dst, &ignore).unwrap();

        assert_eq!(copied, 1);
        assert_eq!(fs::read_to_string(dst.join("Foo.cpp")).unwrap(), "int x;");
        assert!(!dst.join("Foo.h").exists());
        assert!(!dst.join("tsts").exists());
    }

    #[test]
    fn test_copy_dir_filtered_refuses_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        let ignore = IgnoreSet::default();
        assert!(copy_dir_filtered(&src, tmp.path(), &ignore).is_err());
    }

    #[test]
    fn test_file_contains() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("View.h");
        fs::write(&header, "class View : public QWidget {\n  Q_OBJECT\n};\n").unwrap();
        let plain = tmp.path().join("Plain.h");
        fs::write(&plain, b"// \xff\xfe not utf-8\nclass Plain {};\n").unwrap();

        assert!(file_contains(&header, "Q_OBJECT").unwrap());
        assert!(!file_contains(&plain, "Q_OBJECT").unwrap());
    }

    #[test]
    fn test_prune_empty_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("Camera/Kaguya/empty")).unwrap();
        fs::create_dir_all(root.join("Camera/Hirise")).unwrap();
        fs::write(root.join("Camera/Hirise/Hirise.cpp"), "").unwrap();
        fs::create_dir_all(root.join("Core")).unwrap();

        let removed = prune_empty_dirs(root, &[root.join("Core")]).unwrap();

        assert_eq!(removed, 2);
        assert!(!root.join("Camera/Kaguya").exists());
        assert!(root.join("Camera/Hirise/Hirise.cpp").exists());
        assert!(root.join("Core").exists());
    }

    #[test]
    fn test_relative_unix() {
        assert_eq!(
            relative_unix(Path::new("/out/src/Core"), Path::new("/out/include/A.pb.h")),
            "../../include/A.pb.h"
        );
    }

    #[test]
    fn test_append_file() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let out = tmp.path().join("out");
        fs::write(&a, "one\n").unwrap();

        append_file(&a, &out).unwrap();
        append_file(&a, &out).unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "one\none\n");
    }
}
