//! Hardware descriptor supplied by the enclosing build.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The target CPU and the preprocessor defines active for a build.
///
/// Defines are kept sorted so every resolver walks them in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HardwareDescriptor {
    /// CPU core identifier (e.g., "cortex-m4").
    #[serde(default)]
    pub cpu: String,
    /// Active preprocessor defines (e.g., "PIO_USBFS_DEVICE_CDC").
    #[serde(default)]
    pub defines: BTreeSet<String>,
}

impl HardwareDescriptor {
    /// Create a descriptor for `cpu` with no defines.
    pub fn new(cpu: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            defines: BTreeSet::new(),
        }
    }

    /// Add a define.
    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.defines.insert(define.into());
        self
    }

    /// Add several defines.
    pub fn with_defines<I, S>(mut self, defines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defines.extend(defines.into_iter().map(Into::into));
        self
    }

    /// Whether `define` is active.
    pub fn has_define(&self, define: &str) -> bool {
        self.defines.contains(define)
    }
}
