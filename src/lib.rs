//! amforge - migrate a CMake-style ISIS source tree to an autotools layout
//!
//! The library walks the legacy tree, relocates object and app folders,
//! flattens headers, and generates `Makefile.am` fragments plus
//! `configure.ac`. The `amforge` binary is a thin wrapper around
//! [`ops::reformat`].

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Fixtures for unit tests: throwaway legacy trees on disk.
#[cfg(test)]
pub mod test_support;

pub use core::{Family, Layout, ReformatContext, ReformatError};
pub use ops::{reformat, ReformatOptions, ReformatReport};
pub use util::config::Config;
