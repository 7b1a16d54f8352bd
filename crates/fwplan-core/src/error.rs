//! Error types for build plan resolution.

use std::path::PathBuf;

/// Errors that can occur while loading tables or resolving a build plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The CPU identifier has no entry in the port table.
    #[error("unknown target '{cpu}' for {library} (known targets: {})", .known.join(", "))]
    UnknownTarget {
        /// Library being configured.
        library: String,
        /// The unrecognized CPU identifier.
        cpu: String,
        /// CPU identifiers the table does know.
        known: Vec<String>,
    },

    /// A feature flag is declared for both the device and the host role.
    #[error("feature flag '{flag}' is declared for both device and host roles")]
    ConflictingRoles {
        /// The offending flag.
        flag: String,
    },

    /// A mapping table declares the same key twice.
    #[error("duplicate {kind} entry '{key}'")]
    DuplicateEntry {
        /// Kind of entry ("target", "feature flag").
        kind: &'static str,
        /// The duplicated key.
        key: String,
    },

    /// A source filter pattern is malformed.
    #[error("invalid filter pattern '{pattern}': {detail}")]
    InvalidPattern { pattern: String, detail: String },

    /// A source filter rule is not of the form `+<pattern>` or `-<pattern>`.
    #[error("invalid filter rule '{rule}'")]
    InvalidRule { rule: String },

    /// Table file not found.
    #[error("table file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Structural problem in a mapping table.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for plan operations.
pub type Result<T> = std::result::Result<T, PlanError>;
