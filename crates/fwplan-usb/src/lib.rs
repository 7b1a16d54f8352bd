//! Feature resolver for the vendored USB full-speed stack.
//!
//! Maps `PIO_USBFS_*` defines to device and host class directories,
//! adds the matching core directories, and keeps the driver files of an
//! unused role out of the build.
//!
//! ## Modules
//!
//! - [`table`] — Feature flag to class mapping and the stack's directory layout
//! - [`parse`] — TOML loading for custom tables
//! - [`resolve`] — The feature resolver

pub mod parse;
pub mod resolve;
pub mod table;

pub use resolve::resolve_features;
pub use table::{FeatureEntry, FeatureTable, Role};
