//! Port resolver for the vendored real-time kernel.
//!
//! Selects exactly one CPU port implementation from the kernel's
//! `portable/` tree, adds the CPU's floating-point and assembler flags,
//! and optionally enables the CMSIS-RTOS2 compatibility layer.

pub mod parse;
pub mod resolve;
pub mod table;

pub use resolve::resolve_port;
pub use table::{FlagPair, PortEntry, PortTable, ShimLayer};
