//! Declarations shared by every generated library and program fragment.

use std::collections::BTreeSet;

use crate::builder::fragment::Fragment;

/// Rules file included by every fragment.
pub const RULES_MAK: &str = "$(top_srcdir)/config/rules.mak";

/// Rules file providing the protocol-buffer generation recipes.
pub const PROTOBUF_MAK: &str = "$(top_srcdir)/thirdparty/protobuf.mak";

/// Everything the closing block of a fragment needs to know.
#[derive(Debug, Clone, Default)]
pub struct Closing {
    /// `.proto` files relative to the fragment directory.
    pub protos: Vec<String>,
    /// Sources generated by the meta-object compiler, relative.
    pub generated: Vec<String>,
    /// Additional files shipped in the distribution tarball.
    pub extra_dist: Vec<String>,
}

impl Closing {
    /// Directories holding a descriptor, for the include path.
    fn proto_dirs(&self) -> BTreeSet<String> {
        self.protos
            .iter()
            .map(|p| match p.rsplit_once('/') {
                Some((dir, _)) => dir.to_string(),
                None => ".".to_string(),
            })
            .collect()
    }
}

/// Append the closing block: install dir, shared rules, and the protocol
/// and generated-source bookkeeping.
pub fn close(frag: &mut Fragment, closing: &Closing) {
    let has_protos = !closing.protos.is_empty();

    frag.blank()
        .assign("includedir", ["$(prefix)/include"])
        .blank()
        .include(RULES_MAK)
        .blank();

    if has_protos {
        frag.append(
            "AM_CXXFLAGS",
            closing
                .proto_dirs()
                .into_iter()
                .map(|d| format!("-I$(srcdir)/{}", d)),
        );
        frag.assign("include_HEADERS", ["$(protocol_headers)"]);
    }

    let protocol_outputs: &[&str] = if has_protos {
        &["$(protocol_headers)", "$(protocol_sources)"]
    } else {
        &[]
    };

    if has_protos || !closing.generated.is_empty() {
        let built = has_protos
            .then_some("$(protocol_sources)".to_string())
            .into_iter()
            .chain(closing.generated.iter().cloned());
        frag.assign("BUILT_SOURCES", built);

        let clean = protocol_outputs
            .iter()
            .map(|s| s.to_string())
            .chain(closing.generated.iter().cloned());
        frag.assign("CLEANFILES", clean);
    }

    if has_protos || !closing.extra_dist.is_empty() {
        let dist = closing
            .protos
            .iter()
            .cloned()
            .chain(protocol_outputs.iter().map(|s| s.to_string()))
            .chain(closing.extra_dist.iter().cloned());
        frag.assign("EXTRA_DIST", dist);
    }

    if has_protos {
        frag.include(PROTOBUF_MAK);
    }
}

/// Automake-canonical form of a target name for use in variable names.
///
/// Every character outside `[A-Za-z0-9_@]` becomes `_`.
pub fn canonical(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '@' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
