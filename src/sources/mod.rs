//! Reading the legacy tree.
//!
//! The scanner collects the plugin families declared anywhere in the tree;
//! the classifier assigns a single object folder to one of them.

pub mod classify;
pub mod scan;

pub use classify::classify;
pub use scan::{descriptor_files, scan_families};
