//! Test utilities for amforge unit tests.
//!
//! Provides a builder for small legacy trees on disk so each pipeline
//! stage can be exercised against real directories.
//!
//! # Example
//!
//! ```rust,ignore
//! let tree = LegacyTree::new();
//! tree.object("base/objs/Cube", &[("Cube.cpp", ""), ("Cube.h", "")]);
//! tree.object("camera/objs/Hirise", &[("Hirise.cpp", ""), ("Camera.plugin", "")]);
//! ```

pub mod fixtures;

pub use fixtures::*;
