//! Relocation of the legacy tree into the output layout.
//!
//! One walk over `<legacy>/src` visits every `objs` and `apps` directory.
//! Object folders are classified and copied to `src/<family>/<name>` with
//! their headers flattened into `include/`; app folders are copied whole
//! (headers included) to `apps/<name>.dir`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::{AppFolder, Layout, MocHeader, ObjectFolder, ReformatContext};
use crate::sources::classify;
use crate::util::config::RelocateConfig;
use crate::util::fs::{
    copy_dir_filtered, file_contains, file_name, glob_in, prune_empty_dirs, relative_path,
    subdirs, symlink, IgnoreSet,
};

/// Names left out when copying an object folder.
pub const OBJECT_IGNORES: &[&str] = &[
    "Makefile",
    "apps",
    "unitTest.cpp",
    "tsts",
    "*.h",
    "*.truth",
    "*.plugin",
    "*.cub",
    "*.xml",
];

/// Names left out when copying an app folder. Apps keep their headers.
pub const APP_IGNORES: &[&str] = &[
    "Makefile",
    "apps",
    "unitTest.cpp",
    "tsts",
    "*.truth",
    "*.plugin",
    "*.cub",
];

const OBJS_DIR: &str = "objs";
const APPS_DIR: &str = "apps";

pub struct Relocator<'a> {
    layout: &'a Layout,
    config: &'a RelocateConfig,
    build_apps: bool,
    object_ignore: IgnoreSet,
    app_ignore: IgnoreSet,
}

impl<'a> Relocator<'a> {
    pub fn new(layout: &'a Layout, config: &'a RelocateConfig, build_apps: bool) -> Result<Self> {
        Ok(Relocator {
            layout,
            config,
            build_apps,
            object_ignore: IgnoreSet::new(OBJECT_IGNORES)?,
            app_ignore: IgnoreSet::new(APP_IGNORES)?,
        })
    }

    fn is_skipped_dir(&self, name: &str) -> bool {
        self.config.skip_dirs.iter().any(|d| d == name)
    }

    fn is_skipped_app(&self, name: &str) -> bool {
        self.is_skipped_dir(name) || self.config.skip_apps.iter().any(|a| a == name)
    }

    /// Walk `src_root` and relocate every object and app folder.
    pub fn relocate(&self, src_root: &Path, ctx: &mut ReformatContext) -> Result<()> {
        let walker = WalkDir::new(src_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !self.is_skipped_dir(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = entry.with_context(|| format!("failed to walk {}", src_root.display()))?;
            if !entry.file_type().is_dir() {
                continue;
            }

            match entry.file_name().to_string_lossy().as_ref() {
                APPS_DIR if self.build_apps => {
                    for app in subdirs(entry.path())? {
                        let name = file_name(&app);
                        if self.is_skipped_app(&name) {
                            tracing::info!("skipping app {}", name);
                            continue;
                        }
                        self.relocate_app(&app, ctx)?;
                    }
                }
                OBJS_DIR => {
                    for folder in subdirs(entry.path())? {
                        if self.is_skipped_dir(&file_name(&folder)) {
                            continue;
                        }
                        self.relocate_object(&folder, ctx)?;
                    }
                }
                _ => {}
            }
        }

        tracing::info!(
            "relocated {} object folders and {} apps",
            ctx.objects().len(),
            ctx.apps().len()
        );
        Ok(())
    }

    /// Classify and copy one object folder, flattening its headers.
    pub fn relocate_object(&self, folder: &Path, ctx: &mut ReformatContext) -> Result<()> {
        let family = classify(folder)?;
        let name = file_name(folder);
        let destination = Layout::object_rel(&family, &name);
        let dest = self.layout.join(&destination);

        tracing::debug!("{} -> {}", folder.display(), destination.display());
        copy_dir_filtered(folder, &dest, &self.object_ignore)?;

        let include_dir = self.layout.include_dir();
        for header in glob_in(folder, "*.h")? {
            let header_name = file_name(&header);
            let flat = include_dir.join(&header_name);

            if flat.exists() {
                tracing::debug!("header {} already flattened, keeping the first", header_name);
            } else {
                fs::copy(&header, &flat).with_context(|| {
                    format!("failed to copy {} to {}", header.display(), flat.display())
                })?;
                ctx.record_header(header_name.as_str());
            }

            if file_contains(&header, &self.config.moc_marker)? {
                // Sources still include the header from their own folder.
                let link = dest.join(&header_name);
                let target = relative_path(&dest, &flat);
                symlink(&target, &link)
                    .with_context(|| format!("failed to create symlink: {}", link.display()))?;
                ctx.record_moc(MocHeader::new(header_name, destination.clone()));
            }
        }

        ctx.record_object(ObjectFolder {
            name,
            source: folder.to_path_buf(),
            family,
            destination,
        });
        Ok(())
    }

    /// Copy one app folder, headers included.
    pub fn relocate_app(&self, folder: &Path, ctx: &mut ReformatContext) -> Result<()> {
        let name = file_name(folder);
        let destination = Layout::app_rel(&name);
        let dest = self.layout.join(&destination);

        tracing::debug!("{} -> {}", folder.display(), destination.display());
        copy_dir_filtered(folder, &dest, &self.app_ignore)?;

        for header in glob_in(folder, "*.h")? {
            if file_contains(&header, &self.config.moc_marker)? {
                ctx.record_moc(MocHeader::new(file_name(&header), destination.clone()));
            }
        }

        ctx.record_app(AppFolder {
            name,
            source: folder.to_path_buf(),
            destination,
        });
        Ok(())
    }
}

/// Copy headers from the legacy shared include directory that no object
/// folder provided.
pub fn copy_shared_headers(
    inc_dir: &Path,
    include_dir: &Path,
    ctx: &mut ReformatContext,
) -> Result<usize> {
    if !inc_dir.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for header in glob_in(inc_dir, "*.h")? {
        let header_name = file_name(&header);
        let flat = include_dir.join(&header_name);
        if flat.exists() {
            continue;
        }
        fs::copy(&header, &flat)
            .with_context(|| format!("failed to copy {} to {}", header.display(), flat.display()))?;
        tracing::debug!("copied shared header {}", header_name);
        ctx.record_header(header_name);
        copied += 1;
    }
    Ok(copied)
}

/// Remove destination folders that ended up empty, keeping `src` and
/// every family root.
pub fn prune(layout: &Layout, ctx: &ReformatContext) -> Result<usize> {
    let keep: Vec<PathBuf> = ctx
        .families()
        .iter()
        .map(|f| layout.family_dir(f))
        .collect();
    prune_empty_dirs(&layout.src_dir(), &keep)
}
