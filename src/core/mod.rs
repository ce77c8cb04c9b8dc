//! Core data model of a reformat run.

pub mod context;
pub mod errors;
pub mod family;
pub mod folder;
pub mod layout;

pub use context::ReformatContext;
pub use errors::ReformatError;
pub use family::{Family, CORE_FAMILY};
pub use folder::{AppFolder, MocHeader, ObjectFolder};
pub use layout::Layout;
