//! Finishing steps on a generated tree: patches, header edits and the
//! dated archive.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use regex::bytes::Regex;

use crate::core::ReformatError;
use crate::util::config::Substitution;
use crate::util::fs::{file_name, read_bytes, read_to_string, write_bytes};
use crate::util::process::{require_executable, ProcessBuilder};

/// Name of the version file at the legacy root.
pub const VERSION_FILE: &str = "version";

/// Options for [`package`].
#[derive(Debug, Clone)]
pub struct PackageOptions<'a> {
    /// Legacy tree root, read for the version stamp.
    pub source_root: &'a Path,
    /// Generated tree.
    pub destination: &'a Path,
    /// Directory of patch files, if any.
    pub patches_dir: Option<PathBuf>,
    pub substitutions: &'a [Substitution],
    pub basename: &'a str,
    pub archive_dir: &'a Path,
    pub date: NaiveDate,
}

/// Patch, edit and archive the generated tree. Returns the archive path.
pub fn package(opts: &PackageOptions<'_>) -> Result<PathBuf> {
    if let Some(dir) = &opts.patches_dir {
        apply_patches(dir, opts.destination)?;
    }
    apply_substitutions(opts.destination, opts.substitutions)?;

    let version = read_version(opts.source_root)?;
    let archive = opts
        .archive_dir
        .join(archive_name(opts.basename, &version, opts.date));
    create_archive(opts.destination, &archive)?;
    Ok(archive)
}

/// Apply every file in `patch_dir` with `patch -p0`, in name order.
///
/// Returns the number of patches applied.
pub fn apply_patches(patch_dir: &Path, dest: &Path) -> Result<usize> {
    if !patch_dir.is_dir() {
        return Ok(0);
    }

    let mut patches = std::fs::read_dir(patch_dir)
        .with_context(|| format!("failed to read directory: {}", patch_dir.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    patches.retain(|p| p.is_file());
    patches.sort();

    if patches.is_empty() {
        return Ok(0);
    }

    let patch = require_executable("patch")?;
    for file in &patches {
        // patch runs inside `dest`, so the patch file needs an absolute path
        let file = file
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", file.display()))?;
        tracing::info!("applying {}", file_name(&file));
        ProcessBuilder::new(&patch)
            .args(["-p0", "-i"])
            .arg(&file)
            .cwd(dest)
            .exec_and_check()?;
    }
    Ok(patches.len())
}

/// Apply regex substitutions to files of the generated tree.
///
/// Replacements use `regex` syntax, so `$1` refers to a capture group.
/// Files are edited as bytes and need not be UTF-8.
pub fn apply_substitutions(dest: &Path, substitutions: &[Substitution]) -> Result<()> {
    for sub in substitutions {
        let path = dest.join(&sub.file);
        let re = Regex::new(&sub.pattern)
            .with_context(|| format!("invalid substitution pattern `{}`", sub.pattern))?;

        let contents = read_bytes(&path)?;
        let replaced = re.replace_all(&contents, sub.replace.as_bytes());
        if replaced.as_ref() != contents.as_slice() {
            tracing::debug!("{}: s/{}/{}/", sub.file.display(), sub.pattern, sub.replace);
            write_bytes(&path, &replaced)?;
        }
    }
    Ok(())
}

/// Version stamp: the first line of `<source_root>/version`, cut at `#`.
pub fn read_version(source_root: &Path) -> Result<String> {
    let path = source_root.join(VERSION_FILE);
    let contents = read_to_string(&path)?;
    let first = contents.lines().next().unwrap_or_default();
    let version = first.split('#').next().unwrap_or_default().trim();

    if version.is_empty() {
        return Err(ReformatError::MissingVersion { path }.into());
    }
    Ok(version.to_string())
}

/// `<basename>-<version>-<YYYY-MM-DD>.tar.gz`
pub fn archive_name(basename: &str, version: &str, date: NaiveDate) -> String {
    format!("{}-{}-{}.tar.gz", basename, version, date.format("%Y-%m-%d"))
}

/// Write `dir` as a gzipped tarball rooted at its own name.
///
/// Symlinks are stored as links.
pub fn create_archive(dir: &Path, archive: &Path) -> Result<()> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", dir.display()))?;
    let prefix = file_name(&dir);

    let file = File::create(archive)
        .with_context(|| format!("failed to create archive: {}", archive.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    builder
        .append_dir_all(&prefix, &dir)
        .with_context(|| format!("failed to archive {}", dir.display()))?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .with_context(|| format!("failed to finish archive: {}", archive.display()))?;

    tracing::info!("created {}", archive.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tar::Archive;
    use tempfile::TempDir;

    fn entries(archive: &Path) -> Vec<(String, tar::EntryType)> {
        let file = File::open(archive).unwrap();
        let mut archive = Archive::new(GzDecoder::new(file));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (
                    e.path().unwrap().to_string_lossy().trim_end_matches('/').to_string(),
                    e.header().entry_type(),
                )
            })
            .collect()
    }

    #[test]
    fn test_read_version_strips_comment() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("version"), "3.4.2.0 # release\nsecond line\n").unwrap();
        assert_eq!(read_version(tmp.path()).unwrap(), "3.4.2.0");
    }

    #[test]
    fn test_read_version_empty_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("version"), "# nothing here\n").unwrap();
        let err = read_version(tmp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReformatError>(),
            Some(ReformatError::MissingVersion { .. })
        ));
    }

    #[test]
    fn test_archive_name() {
        let date = NaiveDate::from_ymd_opt(2012, 3, 7).unwrap();
        assert_eq!(
            archive_name("ISIS_AutoTools", "3.4.0", date),
            "ISIS_AutoTools-3.4.0-2012-03-07.tar.gz"
        );
    }

    #[test]
    fn test_substitutions_edit_in_place() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("include/BundleAdjust.h");
        fs::create_dir_all(header.parent().unwrap()).unwrap();
        fs::write(
            &header,
            "#include \"CHOLMOD/cholmod.h\"\n#include \"UFconfig.h\"\n",
        )
        .unwrap();

        let subs = crate::util::config::PackageConfig::default().substitutions;
        apply_substitutions(tmp.path(), &subs).unwrap();

        assert_eq!(
            fs::read_to_string(&header).unwrap(),
            "#include \"cholmod.h\"\n#include \"SuiteSparse_config.h\"\n"
        );
    }

    #[test]
    fn test_substitutions_keep_latin1_bytes() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("include/BundleAdjust.h");
        fs::create_dir_all(header.parent().unwrap()).unwrap();
        let mut original = b"// Author: Jos\xe9\n".to_vec();
        original.extend_from_slice(b"#include \"CHOLMOD/cholmod.h\"\n");
        fs::write(&header, &original).unwrap();

        let subs = crate::util::config::PackageConfig::default().substitutions;
        apply_substitutions(tmp.path(), &subs).unwrap();

        assert_eq!(
            fs::read(&header).unwrap(),
            b"// Author: Jos\xe9\n#include \"cholmod.h\"\n".to_vec()
        );
    }

    #[test]
    fn test_substitution_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let subs = vec![Substitution {
            file: PathBuf::from("include/Missing.h"),
            pattern: "a".into(),
            replace: "b".into(),
        }];
        assert!(apply_substitutions(tmp.path(), &subs).is_err());
    }

    #[test]
    fn test_no_patch_dir_is_noop() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            apply_patches(&tmp.path().join("patches"), tmp.path()).unwrap(),
            0
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_keeps_symlinks() {
        let tmp = TempDir::new().unwrap();
        let tree = tmp.path().join("isis_autotools");
        fs::create_dir_all(tree.join("include")).unwrap();
        fs::create_dir_all(tree.join("src/Core/Viewport")).unwrap();
        fs::write(tree.join("include/Viewport.h"), "Q_OBJECT").unwrap();
        std::os::unix::fs::symlink(
            "../../../include/Viewport.h",
            tree.join("src/Core/Viewport/Viewport.h"),
        )
        .unwrap();

        let archive = tmp.path().join("out.tar.gz");
        create_archive(&tree, &archive).unwrap();

        let entries = entries(&archive);
        assert!(entries.iter().any(|(p, t)| {
            p == "isis_autotools/include/Viewport.h" && *t == tar::EntryType::Regular
        }));
        assert!(entries.iter().any(|(p, t)| {
            p == "isis_autotools/src/Core/Viewport/Viewport.h" && *t == tar::EntryType::Symlink
        }));
    }
}
