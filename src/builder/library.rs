//! Fragments for library directories (`src/<Family>` and `src/Core`).
//!
//! Each immediate subdirectory is one relocated module. Plugin families
//! build one library per module; Core merges every module into a single
//! library.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::fragment::Fragment;
use crate::builder::rules::{canonical, close, Closing};
use crate::util::config::LibraryConfig;
use crate::util::fs::{file_name, glob_in, relative_unix, subdirs, to_unix};

/// Where the generated `.pb.h` of a module lands.
#[derive(Debug, Clone, Copy)]
enum ProtoHeaders<'a> {
    /// Next to its descriptor.
    InModule,
    /// In the flat include directory.
    In(&'a Path),
}

/// Sources and descriptors found in one module folder.
#[derive(Debug)]
struct Module {
    name: String,
    /// Compiled sources relative to the library directory.
    sources: Vec<String>,
    /// Descriptor paths without their `.proto` extension.
    proto_prefixes: Vec<PathBuf>,
}

impl Module {
    fn scan(dir: &Path, module_dir: &Path) -> Result<Self> {
        let sources = glob_in(module_dir, "*.cpp")?
            .iter()
            .map(|p| relative_unix(dir, p))
            .collect();
        let proto_prefixes = glob_in(module_dir, "*.proto")?
            .into_iter()
            .map(|p| p.with_extension(""))
            .collect();
        Ok(Module {
            name: file_name(module_dir),
            sources,
            proto_prefixes,
        })
    }

    fn generated_sources(&self, dir: &Path) -> Vec<String> {
        self.proto_prefixes
            .iter()
            .map(|prefix| relative_unix(dir, &with_suffix(prefix, ".pb.cc")))
            .collect()
    }

    fn generated_headers(&self, dir: &Path, headers: ProtoHeaders<'_>) -> Vec<String> {
        self.proto_prefixes
            .iter()
            .map(|prefix| match headers {
                ProtoHeaders::InModule => relative_unix(dir, &with_suffix(prefix, ".pb.h")),
                ProtoHeaders::In(include_dir) => {
                    let header = format!("{}.pb.h", file_name(prefix));
                    relative_unix(dir, &include_dir.join(header))
                }
            })
            .collect()
    }

    fn proto_files(&self, dir: &Path) -> Vec<String> {
        self.proto_prefixes
            .iter()
            .map(|prefix| relative_unix(dir, &with_suffix(prefix, ".proto")))
            .collect()
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

fn scan_modules(dir: &Path) -> Result<Vec<Module>> {
    subdirs(dir)?
        .iter()
        .map(|module_dir| Module::scan(dir, module_dir))
        .collect()
}

/// Record a module's protocol outputs in the fragment and closing block.
fn declare_protocols(
    frag: &mut Fragment,
    closing: &mut Closing,
    dir: &Path,
    module: &Module,
    headers: ProtoHeaders<'_>,
) {
    if module.proto_prefixes.is_empty() {
        return;
    }
    frag.assign("protocol_headers", module.generated_headers(dir, headers))
        .assign("protocol_sources", module.generated_sources(dir))
        .blank();
    closing.protos.extend(module.proto_files(dir));
}

/// Fragment for a plugin family directory.
///
/// `moc_sources` are the generated meta-object sources relocated beneath
/// `dir`, relative to it; each is compiled into its own module's library.
pub fn plugin_fragment(
    dir: &Path,
    moc_sources: &[PathBuf],
    lib: &LibraryConfig,
) -> Result<Fragment> {
    let mut frag = Fragment::new();
    let mut closing = Closing::default();
    let mut libraries = Vec::new();

    for module in scan_modules(dir)? {
        declare_protocols(&mut frag, &mut closing, dir, &module, ProtoHeaders::InModule);

        let moc: Vec<String> = moc_sources
            .iter()
            .filter(|m| m.starts_with(&module.name))
            .map(|m| to_unix(m))
            .collect();
        closing.generated.extend(moc.iter().cloned());

        let sources: Vec<String> = module
            .sources
            .iter()
            .cloned()
            .chain(module.generated_sources(dir))
            .chain(moc)
            .collect();
        if sources.is_empty() {
            tracing::debug!("module {} has nothing to compile", module.name);
            continue;
        }

        let var = format!("lib{}_la", canonical(&module.name));
        frag.assign_list(&format!("{}_SOURCES", var), sources)
            .assign(&format!("{}_LIBADD", var), libadd(&lib.plugin_libadd))
            .blank();
        libraries.push(format!("lib{}.la", module.name));
    }

    frag.assign("lib_LTLIBRARIES", libraries);
    close(&mut frag, &closing);
    Ok(frag)
}

/// Fragment for the Core directory: one library from every module.
///
/// Generated protocol headers are placed in `include_dir` so the rest of
/// the tree can include them like any other flattened header.
pub fn core_fragment(
    dir: &Path,
    include_dir: &Path,
    moc_sources: &[PathBuf],
    lib: &LibraryConfig,
) -> Result<Fragment> {
    let mut frag = Fragment::new();
    let mut closing = Closing::default();
    let mut sources = Vec::new();

    for module in scan_modules(dir)? {
        declare_protocols(
            &mut frag,
            &mut closing,
            dir,
            &module,
            ProtoHeaders::In(include_dir),
        );
        sources.extend(module.sources.iter().cloned());
        sources.extend(module.generated_sources(dir));
    }

    for moc in moc_sources {
        let moc = to_unix(moc);
        sources.push(moc.clone());
        closing.generated.push(moc);
    }

    let var = format!("lib{}_la", canonical(&lib.core_name));
    frag.assign_list(&format!("{}_SOURCES", var), sources)
        .blank()
        .assign(&format!("{}_LIBADD", var), libadd(&lib.core_libadd))
        .assign("lib_LTLIBRARIES", [lib.core_archive()]);

    close(&mut frag, &closing);
    Ok(frag)
}

fn libadd(token: &str) -> Vec<String> {
    if token.is_empty() {
        Vec::new()
    } else {
        vec![token.to_string()]
    }
}
