//! Pipeline stages.
//!
//! [`reformat`] runs them in order: relocation, fragment assembly, then
//! packaging.

pub mod assemble;
pub mod package;
pub mod reformat;
pub mod relocate;

pub use package::{package, PackageOptions};
pub use reformat::{
    reformat, ReformatOptions, ReformatReport, DEFAULT_BASENAME, DEFAULT_DESTINATION,
};
pub use relocate::Relocator;
