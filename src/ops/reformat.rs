//! The `reformat` pipeline: scan, relocate, generate, package.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

use crate::builder::write_configure;
use crate::core::{Layout, ReformatContext, ReformatError};
use crate::ops::assemble::{
    write_apps_fragment, write_extra, write_library_fragments, write_toplevel,
};
use crate::ops::package::{package, PackageOptions};
use crate::ops::relocate::{copy_shared_headers, prune, Relocator};
use crate::sources::scan_families;
use crate::util::config::Config;
use crate::util::fs::{copy_dir_filtered, create_new_dir, ensure_dir, IgnoreSet};

pub const DEFAULT_DESTINATION: &str = "isis_autotools";
pub const DEFAULT_BASENAME: &str = "ISIS_AutoTools";

/// Overlay copied into the destination before anything else.
pub const OVERLAY_DIR: &str = "dist-add";
pub const PATCHES_DIR: &str = "patches";

/// Options for [`reformat`].
#[derive(Debug, Clone)]
pub struct ReformatOptions {
    /// Root of the legacy tree (holds `src/`, `inc/`, `version`).
    pub source: PathBuf,
    /// Output directory; must not exist.
    pub destination: PathBuf,
    /// Archive base name.
    pub basename: String,
    pub build_apps: bool,
    /// Directory holding `dist-add/`, `patches/` and the example options.
    pub resources: Option<PathBuf>,
    /// Run the packager after generation.
    pub package: bool,
    /// Where the archive is written.
    pub archive_dir: PathBuf,
}

impl ReformatOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        ReformatOptions {
            source: source.into(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            basename: DEFAULT_BASENAME.to_string(),
            build_apps: true,
            resources: None,
            package: true,
            archive_dir: PathBuf::from("."),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default)]
pub struct ReformatReport {
    /// Destination families, Core last.
    pub families: Vec<String>,
    pub objects: usize,
    pub apps: usize,
    /// Headers in the flat include directory.
    pub headers: usize,
    /// Every fragment written, in write order.
    pub fragments: Vec<PathBuf>,
    /// Whether `configure.ac` was rendered.
    pub configure: bool,
    pub archive: Option<PathBuf>,
}

/// Convert the legacy tree at `opts.source` into `opts.destination`.
pub fn reformat(opts: &ReformatOptions, config: &Config) -> Result<ReformatReport> {
    let src_root = opts.source.join("src");
    if !opts.source.is_dir() || !src_root.is_dir() {
        return Err(ReformatError::InvalidSourceTree {
            path: opts.source.clone(),
        }
        .into());
    }

    prepare_destination(&opts.destination, opts.resources.as_deref())?;
    let layout = Layout::new(&opts.destination);

    let families = scan_families(&src_root)?;
    tracing::info!("found {} plugin families", families.len());
    let mut ctx = ReformatContext::new(families);

    for family in ctx.families() {
        ensure_dir(&layout.family_dir(&family))?;
    }
    ensure_dir(&layout.include_dir())?;
    if opts.build_apps {
        ensure_dir(&layout.apps_dir())?;
    }

    Relocator::new(&layout, &config.relocate, opts.build_apps)?.relocate(&src_root, &mut ctx)?;
    let pruned = prune(&layout, &ctx)?;
    tracing::debug!("pruned {} empty directories", pruned);
    copy_shared_headers(&opts.source.join("inc"), &layout.include_dir(), &mut ctx)?;

    let mut fragments = write_library_fragments(&layout, &ctx, &config.library)?;
    if opts.build_apps {
        fragments.push(write_apps_fragment(
            &layout,
            &ctx,
            &config.library,
            &config.apps,
        )?);
    }
    fragments.push(write_extra(&layout, &opts.source, &src_root, &config.extra)?);
    fragments.extend(write_toplevel(
        &layout,
        &ctx,
        opts.build_apps,
        opts.resources.as_deref(),
    )?);
    tracing::info!("wrote {} build files", fragments.len());

    let configure = write_configure(layout.root(), &config.template.keyword)?;

    let archive = if opts.package {
        let patches_dir = opts.resources.as_ref().map(|r| r.join(PATCHES_DIR));
        Some(package(&PackageOptions {
            source_root: &opts.source,
            destination: &opts.destination,
            patches_dir,
            substitutions: &config.package.substitutions,
            basename: &opts.basename,
            archive_dir: &opts.archive_dir,
            date: Local::now().date_naive(),
        })?)
    } else {
        None
    };

    Ok(ReformatReport {
        families: ctx.families().iter().map(|f| f.dir_name().to_string()).collect(),
        objects: ctx.objects().len(),
        apps: ctx.apps().len(),
        headers: ctx.headers().len(),
        fragments,
        configure,
        archive,
    })
}

/// Create the destination, seeding it from `<resources>/dist-add` when
/// that overlay exists.
fn prepare_destination(destination: &Path, resources: Option<&Path>) -> Result<()> {
    if destination.exists() {
        return Err(ReformatError::DestinationExists {
            path: destination.to_path_buf(),
        }
        .into());
    }

    match resources.map(|r| r.join(OVERLAY_DIR)).filter(|o| o.is_dir()) {
        Some(overlay) => {
            let copied = copy_dir_filtered(&overlay, destination, &IgnoreSet::new(&["*~"])?)?;
            tracing::info!("seeded destination with {} files from {}", copied, overlay.display());
        }
        None => {
            if let Some(parent) = destination.parent() {
                ensure_dir(parent)?;
            }
            create_new_dir(destination)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::builder::configure::TEMPLATE_FILE;
    use crate::test_support::{cpp_source, qt_header, LegacyTree};
    use crate::util::fs::read_to_string;

    fn options(tree: &LegacyTree) -> ReformatOptions {
        let mut opts = ReformatOptions::new(tree.root());
        opts.destination = tree.out();
        opts.package = false;
        opts
    }

    fn fragment(tree: &LegacyTree, rel: &str) -> String {
        read_to_string(&tree.out().join(rel).join("Makefile.am")).unwrap()
    }

    #[test]
    fn test_core_round_trip() {
        let tree = LegacyTree::new();
        tree.object(
            "base/objs/Foo",
            &[("foo.cpp", cpp_source("Foo").as_str()), ("foo.h", "class Foo;")],
        );

        let report = reformat(&options(&tree), &Config::default()).unwrap();

        assert!(tree.out().join("src/Core/Foo/foo.cpp").is_file());
        assert!(tree.out().join("include/foo.h").is_file());
        assert!(fragment(&tree, "src/Core").contains("  Foo/foo.cpp"));
        assert_eq!(report.families, vec!["Core"]);
        assert_eq!(report.objects, 1);
        assert_eq!(report.headers, 1);
        assert!(!report.configure);
        assert!(report.archive.is_none());
    }

    #[test]
    fn test_plugin_family_library() {
        let tree = LegacyTree::new();
        tree.object("base/objs/Bar", &[("bar.cpp", ""), ("bar.plugin", "")]);

        reformat(&options(&tree), &Config::default()).unwrap();

        assert!(tree.out().join("src/bar/Bar/bar.cpp").is_file());
        let frag = fragment(&tree, "src/bar");
        assert!(frag.contains("libBar_la_SOURCES = \\\n  Bar/bar.cpp\n"));
        assert!(frag.contains("lib_LTLIBRARIES = libBar.la"));
        assert!(fragment(&tree, "extra").contains("mylib_DATA = bar.plugin"));
    }

    #[test]
    fn test_proto_descriptor_declarations() {
        let tree = LegacyTree::new();
        tree.object(
            "base/objs/Net",
            &[("net.cpp", ""), ("msg.proto", ""), ("Net.plugin", "")],
        );

        reformat(&options(&tree), &Config::default()).unwrap();

        let frag = fragment(&tree, "src/Net");
        assert!(frag.contains("protocol_headers = Net/msg.pb.h"));
        assert!(frag.contains("protocol_sources = Net/msg.pb.cc"));
        assert!(frag.contains("AM_CXXFLAGS += -I$(srcdir)/Net"));
        assert!(frag.contains("Net/msg.proto"));
        assert!(frag.contains("CLEANFILES"));
        assert!(frag.contains("include $(top_srcdir)/thirdparty/protobuf.mak"));
    }

    #[test]
    fn test_shared_app_source_linked_by_object() {
        let tree = LegacyTree::new();
        tree.app("base/apps/alpha", &[("alpha.cpp", ""), ("shared.cpp", "")])
            .app("base/apps/beta", &[("beta.cpp", ""), ("shared.cpp", "")]);

        let report = reformat(&options(&tree), &Config::default()).unwrap();

        assert_eq!(report.apps, 2);
        let frag = fragment(&tree, "apps");
        assert!(frag.contains("alpha.dir/shared.cpp"));
        assert!(!frag.contains("beta.dir/shared.cpp"));
        assert!(frag.contains("beta_LDADD = shared.$(OBJEXT) ../src/Core/libisis3.la"));
        let root = fragment(&tree, "");
        assert!(root.contains("SUBDIRS = src include extra apps"));
    }

    #[test]
    fn test_ambiguous_folder_stops_before_fragments() {
        let tree = LegacyTree::new();
        tree.object("base/objs/Dual", &[("A.plugin", ""), ("B.plugin", "")]);

        let err = reformat(&options(&tree), &Config::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReformatError>(),
            Some(ReformatError::AmbiguousFamily { .. })
        ));
        assert!(!tree.out().join("src/A/Makefile.am").exists());
        assert!(!tree.out().join("src/Core/Makefile.am").exists());
    }

    #[test]
    fn test_src_subdirs_are_families_plus_core() {
        let tree = LegacyTree::new();
        tree.object("mro/objs/Hirise", &[("Hirise.cpp", ""), ("Camera.plugin", "")])
            .object("base/objs/Cube", &[("Cube.cpp", "")])
            .folder("base/objs/Proj", &[("Map.plugin", "")]);

        let report = reformat(&options(&tree), &Config::default()).unwrap();

        assert_eq!(report.families, vec!["Camera", "Map", "Core"]);
        assert_eq!(
            fragment(&tree, "src"),
            "SUBDIRS = \\\n  Camera \\\n  Map \\\n  Core\n\n"
        );
        assert!(tree.out().join("src/Map").is_dir());
    }

    #[test]
    fn test_core_descriptor_merges_into_core() {
        let tree = LegacyTree::new();
        tree.object("base/objs/Ext", &[("ext.cpp", ""), ("Core.plugin", "")])
            .object("base/objs/Cube", &[("Cube.cpp", "")]);

        let report = reformat(&options(&tree), &Config::default()).unwrap();

        assert_eq!(report.families, vec!["Core"]);
        let core = tree.out().join("src/Core/Makefile.am");
        assert_eq!(report.fragments.iter().filter(|f| **f == core).count(), 1);
        assert_eq!(fragment(&tree, "src"), "SUBDIRS = \\\n  Core\n\n");
        let frag = fragment(&tree, "src/Core");
        assert!(frag.contains("Ext/ext.cpp"));
        assert!(frag.contains("Cube/Cube.cpp"));
        assert!(!tree.out().join("extra/Core.plugin").exists());
    }

    #[test]
    fn test_invalid_source_writes_nothing() {
        let tree = LegacyTree::new();
        let mut opts = options(&tree);
        opts.source = tree.root().join("missing");

        let err = reformat(&opts, &Config::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReformatError>(),
            Some(ReformatError::InvalidSourceTree { .. })
        ));
        assert!(!tree.out().exists());
    }

    #[test]
    fn test_existing_destination_rejected() {
        let tree = LegacyTree::new();
        fs::create_dir_all(tree.out()).unwrap();

        let err = reformat(&options(&tree), &Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReformatError>(),
            Some(ReformatError::DestinationExists { .. })
        ));
    }

    #[test]
    fn test_overlay_and_configure() {
        let tree = LegacyTree::new();
        tree.object(
            "qt/objs/Viewport",
            &[("Viewport.cpp", ""), ("Viewport.h", qt_header("Viewport").as_str())],
        );
        let resources = tree.scratch("resources");
        fs::create_dir_all(resources.join(OVERLAY_DIR)).unwrap();
        fs::write(
            resources.join(OVERLAY_DIR).join(TEMPLATE_FILE),
            "AC_INIT([isis], [3])\nAMFORGE_INSERT_HERE AC_CONFIG_FILES\nAC_OUTPUT\n",
        )
        .unwrap();
        fs::write(resources.join(OVERLAY_DIR).join("autogen~"), "backup").unwrap();

        let mut opts = options(&tree);
        opts.resources = Some(resources);
        opts.build_apps = false;
        let report = reformat(&opts, &Config::default()).unwrap();

        assert!(report.configure);
        assert!(!tree.out().join("autogen~").exists());
        assert!(!tree.out().join("apps").exists());

        let configure = read_to_string(&tree.out().join("configure.ac")).unwrap();
        assert!(configure.contains("  src/Core/Makefile \\\n"));
        assert!(configure.contains("  ./Makefile \\\n])\n"));
        assert!(!configure.contains("apps/Makefile"));

        let core = fragment(&tree, "src/Core");
        assert!(core.contains("Viewport/Viewport.moc.cc"));
    }

    #[test]
    fn test_packaging_writes_dated_archive() {
        let tree = LegacyTree::new();
        tree.object("base/objs/BundleAdjust", &[("BundleAdjust.cpp", "")])
            .file(
                "src/base/objs/BundleAdjust/BundleAdjust.h",
                "#include <CHOLMOD/cholmod.h>\n",
            )
            .file("version", "3.4.0 # stable\n");
        let archives = tree.scratch("archives");

        let mut opts = options(&tree);
        opts.package = true;
        opts.archive_dir = archives.clone();
        let report = reformat(&opts, &Config::default()).unwrap();

        let archive = report.archive.unwrap();
        assert!(archive.is_file());
        assert!(archive.starts_with(&archives));
        assert!(crate::util::fs::file_name(&archive).starts_with("ISIS_AutoTools-3.4.0-"));
        assert_eq!(
            read_to_string(&tree.out().join("include/BundleAdjust.h")).unwrap(),
            "#include <cholmod.h>\n"
        );
    }
}
