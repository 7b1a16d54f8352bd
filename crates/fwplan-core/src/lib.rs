//! Build plan model for vendored firmware libraries.
//!
//! A resolver turns a [`HardwareDescriptor`] plus a static mapping table into
//! a [`BuildPlan`]: an ordered source filter, a set of include directories,
//! and extra compiler/linker flags and defines. The plan is then broadcast to
//! one or more [`EnvironmentSink`]s.
//!
//! ## Modules
//!
//! - [`descriptor`] — Target CPU and active preprocessor defines
//! - [`filter`] — Source filter patterns and last-match-wins evaluation
//! - [`plan`] — Build plan and include path set
//! - [`sink`] — Environment sinks and plan broadcast
//! - [`error`] — Error type shared by all resolvers

pub mod descriptor;
pub mod error;
pub mod filter;
pub mod plan;
pub mod sink;

pub use descriptor::HardwareDescriptor;
pub use error::{PlanError, Result};
pub use filter::{FilterRule, Pattern, SourceFilter, Verdict};
pub use plan::{BuildPlan, IncludePaths, Warning};
pub use sink::{EnvironmentSink, RecordingSink, Scope};
