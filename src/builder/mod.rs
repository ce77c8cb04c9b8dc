//! Build-file generation.
//!
//! Every generated directory gets one [`Fragment`] rendered to
//! `Makefile.am`; the output root additionally gets `configure.ac`.

pub mod apps;
pub mod configure;
pub mod fragment;
pub mod library;
pub mod rules;
pub mod toplevel;

pub use apps::{apps_fragment, AppsLinkage, SourceRegistry};
pub use configure::write_configure;
pub use fragment::{Fragment, Operator};
pub use library::{core_fragment, plugin_fragment};
pub use toplevel::{extra_fragment, include_fragment, root_fragment, src_fragment};
