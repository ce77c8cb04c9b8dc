//! Fragments for the directories above the libraries: the output root,
//! `src`, `include` and `extra`.

use std::path::Path;

use anyhow::Result;

use crate::builder::fragment::Fragment;
use crate::core::Family;
use crate::util::fs::{file_name, glob_in};

/// `src/Makefile.am`: one subdirectory per family, Core included.
pub fn src_fragment(families: &[Family]) -> Fragment {
    let mut frag = Fragment::new();
    frag.assign_list("SUBDIRS", families.iter().map(|f| f.dir_name().to_string()))
        .blank();
    frag
}

/// The root `Makefile.am`.
pub fn root_fragment(build_apps: bool) -> Fragment {
    let mut subdirs = vec!["src", "include", "extra"];
    if build_apps {
        subdirs.push("apps");
    }

    let mut frag = Fragment::new();
    frag.assign("ACLOCAL_AMFLAGS", ["-I m4"])
        .assign("SUBDIRS", subdirs)
        .blank()
        .assign("EXTRA_DIST", ["autogen", "config.options.example"]);
    frag
}

/// `include/Makefile.am`: every flattened header.
pub fn include_fragment(include_dir: &Path) -> Result<Fragment> {
    let headers = glob_in(include_dir, "*.h")?;

    let mut frag = Fragment::new();
    frag.assign_list("include_HEADERS", headers.iter().map(|h| file_name(h)))
        .blank()
        .assign("includedir", ["$(prefix)/include"]);
    Ok(frag)
}

/// `extra/Makefile.am`: data files at the prefix, merged descriptors
/// next to the libraries.
///
/// `descriptors` are the file names present in `extra/`.
pub fn extra_fragment(data_files: &[String], descriptors: &[String]) -> Fragment {
    let mut frag = Fragment::new();
    frag.assign("prefixdir", ["@prefix@"])
        .assign("prefix_DATA", data_files.iter().cloned())
        .assign("mylibdir", ["$(libdir)"])
        .assign("mylib_DATA", descriptors.iter().cloned())
        .assign(
            "EXTRA_DIST",
            data_files.iter().cloned().chain(descriptors.iter().cloned()),
        );
    frag
}
