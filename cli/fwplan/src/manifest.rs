//! `fwplan.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fwplan_core::HardwareDescriptor;
use fwplan_kernel::parse::load_port_table;
use fwplan_kernel::PortTable;
use fwplan_usb::parse::load_feature_table;
use fwplan_usb::FeatureTable;
use serde::{Deserialize, Serialize};

/// Manifest file name.
pub const MANIFEST_NAME: &str = "fwplan.toml";

/// The top-level manifest structure for a firmware project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FwplanManifest {
    /// Target CPU and active defines.
    pub board: HardwareDescriptor,
    /// Kernel library, if the project vendors it.
    #[serde(default)]
    pub kernel: Option<LibraryConfig>,
    /// USB stack, if the project vendors it.
    #[serde(default)]
    pub usb: Option<LibraryConfig>,
}

/// Location of a vendored library and an optional custom table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Library root, relative to the project directory.
    pub root: PathBuf,
    /// Mapping table replacing the built-in one, relative to the project directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<PathBuf>,
}

impl FwplanManifest {
    /// Search upward from `start_dir` for `fwplan.toml`, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_NAME);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: FwplanManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing fwplan.toml")
    }

    /// Generate the default template for `fwplan init`.
    pub fn template(cpu: &str) -> Result<String> {
        let manifest = FwplanManifest {
            board: HardwareDescriptor::new(cpu),
            kernel: Some(LibraryConfig::at("lib/FreeRTOS")),
            usb: Some(LibraryConfig::at("lib/GD32F3x0_usbfs_library")),
        };
        toml::to_string_pretty(&manifest).context("serializing fwplan.toml template")
    }
}

impl LibraryConfig {
    /// Library at `root` using the built-in table.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            table: None,
        }
    }
}

/// Port table for the project: the configured file, or the built-in table.
pub fn port_table(project_dir: &Path, config: Option<&LibraryConfig>) -> Result<PortTable> {
    match config.and_then(|c| c.table.as_ref()) {
        Some(path) => {
            let path = project_dir.join(path);
            load_port_table(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(PortTable::freertos()),
    }
}

/// Feature table for the project: the configured file, or the built-in table.
pub fn feature_table(project_dir: &Path, config: Option<&LibraryConfig>) -> Result<FeatureTable> {
    match config.and_then(|c| c.table.as_ref()) {
        Some(path) => {
            let path = project_dir.join(path);
            load_feature_table(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(FeatureTable::gd32_usbfs()),
    }
}
