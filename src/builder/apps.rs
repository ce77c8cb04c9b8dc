//! Fragment for the executables directory (`apps`).
//!
//! Every `<app>.dir` folder with at least one `.cpp` becomes a program.
//! The legacy tree ships the same source file name in several apps; only
//! the first app compiles it, later ones link the object it produced.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::fragment::Fragment;
use crate::builder::rules::{canonical, close, Closing};
use crate::util::fs::{file_name, glob_in, relative_unix, subdirs, to_unix};

/// Source file names already compiled by an earlier app of one directory.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    seen: HashSet<String>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        SourceRegistry::default()
    }

    /// Record `file_name`; returns `false` if an earlier app owns it.
    pub fn claim(&mut self, file_name: &str) -> bool {
        self.seen.insert(file_name.to_string())
    }
}

/// Inputs of the apps fragment besides the directory contents.
#[derive(Debug, Clone)]
pub struct AppsLinkage<'a> {
    /// Core library as seen from the apps directory.
    pub core_library: String,
    /// Extra link entries per app name.
    pub extra: &'a BTreeMap<String, Vec<String>>,
}

/// Fragment for the apps directory.
///
/// `moc_sources` are the generated meta-object sources relocated beneath
/// `dir`, relative to it (`<app>.dir/<stem>.moc.cc`).
pub fn apps_fragment(
    dir: &Path,
    moc_sources: &[PathBuf],
    linkage: &AppsLinkage<'_>,
) -> Result<Fragment> {
    let mut frag = Fragment::new();
    let mut closing = Closing::default();
    let mut registry = SourceRegistry::new();
    let mut programs = Vec::new();
    let mut xml_files = Vec::new();

    for app_dir in subdirs(dir)? {
        let dir_name = file_name(&app_dir);
        let app = dir_name.split('.').next().unwrap_or_default().to_string();

        xml_files.extend(
            glob_in(&app_dir, "*.xml")?
                .iter()
                .map(|p| relative_unix(dir, p)),
        );

        let cpp = glob_in(&app_dir, "*.cpp")?;
        if cpp.is_empty() {
            tracing::debug!("app {} has no sources, not a program", app);
            continue;
        }

        let mut sources = Vec::new();
        let mut ldadd = Vec::new();
        for source in &cpp {
            let name = file_name(source);
            if registry.claim(&name) {
                sources.push(relative_unix(dir, source));
            } else {
                let stem = name.split('.').next().unwrap_or_default();
                tracing::debug!("{} reuses the object of {} compiled by an earlier app", app, name);
                ldadd.push(format!("{}.$(OBJEXT)", stem));
            }
        }

        for moc in moc_sources.iter().filter(|m| m.starts_with(&dir_name)) {
            let moc = to_unix(moc);
            sources.push(moc.clone());
            closing.generated.push(moc);
        }

        ldadd.push(linkage.core_library.clone());
        if let Some(extra) = linkage.extra.get(&app) {
            ldadd.extend(extra.iter().cloned());
        }

        let var = canonical(&app);
        frag.assign_list(&format!("{}_SOURCES", var), sources)
            .assign(&format!("{}_LDADD", var), ldadd)
            .assign(&format!("{}_CFLAGS", var), ["$(AM_CFLAGS)"])
            .blank();
        programs.push(app);
    }

    frag.assign("bin_PROGRAMS", programs)
        .assign("xmlhelpdir", ["$(bindir)/xml"])
        .assign("xmlhelp_DATA", xml_files.iter().cloned());

    closing.extra_dist = xml_files;
    close(&mut frag, &closing);
    Ok(frag)
}
