//! Writes every fragment of the generated tree plus the `extra` directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::{
    apps_fragment, core_fragment, extra_fragment, include_fragment, plugin_fragment,
    root_fragment, src_fragment, AppsLinkage, Fragment,
};
use crate::core::family::descriptor_family;
use crate::core::layout::FRAGMENT_FILE;
use crate::core::{Layout, ReformatContext, CORE_FAMILY};
use crate::sources::descriptor_files;
use crate::util::config::{AppsConfig, ExtraConfig, LibraryConfig};
use crate::util::fs::{append_file, ensure_dir, file_name};

/// Example configuration copied from the resources directory.
pub const OPTIONS_EXAMPLE: &str = "config.options.example";

/// Write `frag` as the fragment of `dir`.
pub fn write_fragment(dir: &Path, frag: &Fragment) -> Result<PathBuf> {
    let path = dir.join(FRAGMENT_FILE);
    frag.write_to(&path)?;
    Ok(path)
}

/// One fragment per plugin family, then the Core fragment.
pub fn write_library_fragments(
    layout: &Layout,
    ctx: &ReformatContext,
    lib: &LibraryConfig,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for family in ctx.families() {
        let dir = layout.family_dir(&family);
        let moc = ctx.moc_sources_under(&Layout::family_rel(&family));
        let frag = if family.is_core() {
            core_fragment(&dir, &layout.include_dir(), &moc, lib)?
        } else {
            plugin_fragment(&dir, &moc, lib)?
        };
        written.push(write_fragment(&dir, &frag)?);
    }
    Ok(written)
}

/// Fragment of the executables directory.
pub fn write_apps_fragment(
    layout: &Layout,
    ctx: &ReformatContext,
    lib: &LibraryConfig,
    apps: &AppsConfig,
) -> Result<PathBuf> {
    let dir = layout.apps_dir();
    let linkage = AppsLinkage {
        core_library: format!("../src/{}/{}", CORE_FAMILY, lib.core_archive()),
        extra: &apps.ldadd,
    };
    let frag = apps_fragment(&dir, &ctx.moc_sources_under(Path::new("apps")), &linkage)?;
    write_fragment(&dir, &frag)
}

/// Populate `extra/` and write its fragment.
///
/// Data files come from the legacy root; every plugin descriptor under
/// `src_root` is appended to the same-named file in `extra/`, so
/// descriptors sharing a file name end up merged. Core descriptors are
/// not installed.
pub fn write_extra(
    layout: &Layout,
    source_root: &Path,
    src_root: &Path,
    extra: &ExtraConfig,
) -> Result<PathBuf> {
    let dir = layout.extra_dir();
    ensure_dir(&dir)?;

    let mut data_files = Vec::new();
    for name in &extra.data_files {
        let src = source_root.join(name);
        if !src.is_file() {
            tracing::warn!("data file {} not found, leaving it out", src.display());
            continue;
        }
        fs::copy(&src, dir.join(name))
            .with_context(|| format!("failed to copy {} to {}", src.display(), dir.display()))?;
        data_files.push(name.clone());
    }

    let mut merged = BTreeSet::new();
    for descriptor in descriptor_files(src_root)? {
        let name = file_name(&descriptor);
        match descriptor_family(&name) {
            Some(CORE_FAMILY) => {
                tracing::debug!("not installing Core descriptor {}", descriptor.display());
            }
            Some(_) => {
                append_file(&descriptor, &dir.join(&name))?;
                merged.insert(name);
            }
            None => {}
        }
    }
    tracing::debug!("merged descriptors into {} files", merged.len());

    let descriptors: Vec<String> = merged.into_iter().collect();
    write_fragment(&dir, &extra_fragment(&data_files, &descriptors))
}

/// The `src`, root and `include` fragments.
///
/// `resources` is searched for the example options file shipped next to
/// the root fragment.
pub fn write_toplevel(
    layout: &Layout,
    ctx: &ReformatContext,
    build_apps: bool,
    resources: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut written = vec![write_fragment(
        &layout.src_dir(),
        &src_fragment(&ctx.families()),
    )?];

    if let Some(example) = resources.map(|r| r.join(OPTIONS_EXAMPLE)) {
        if example.is_file() {
            fs::copy(&example, layout.join(OPTIONS_EXAMPLE))
                .with_context(|| format!("failed to copy {}", example.display()))?;
        }
    }
    written.push(write_fragment(layout.root(), &root_fragment(build_apps))?);

    let include_dir = layout.include_dir();
    written.push(write_fragment(&include_dir, &include_fragment(&include_dir)?)?);
    Ok(written)
}
