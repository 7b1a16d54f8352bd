//! `fwplan plan` — resolve every library configured in fwplan.toml.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::commands::report::{self, OutputFormat, PlanReport};
use crate::commands::{kernel, usb};
use crate::manifest::{self, FwplanManifest};

/// Resolve all configured libraries.
///
/// Every library is resolved before any plan is applied, so one failing
/// library leaves nothing half-configured.
pub fn build(project_dir: &Path, manifest: &FwplanManifest) -> Result<PlanReport> {
    let mut resolved = Vec::new();

    if let Some(config) = &manifest.kernel {
        let table = manifest::port_table(project_dir, Some(config))?;
        resolved.push(
            kernel::resolved(&manifest.board, &table, project_dir.join(&config.root))
                .context("resolving kernel")?,
        );
    }
    if let Some(config) = &manifest.usb {
        let table = manifest::feature_table(project_dir, Some(config))?;
        resolved.push(
            usb::resolved(&manifest.board, &table, project_dir.join(&config.root))
                .context("resolving USB stack")?,
        );
    }
    if resolved.is_empty() {
        bail!("fwplan.toml configures no library. Add a [kernel] or [usb] section.");
    }

    report::assemble(resolved)
}

/// Resolve and print every configured library.
pub fn run(
    project_dir: &Path,
    manifest: Option<&FwplanManifest>,
    format: OutputFormat,
    list_sources: bool,
) -> Result<()> {
    let Some(manifest) = manifest else {
        bail!("fwplan.toml not found. Run 'fwplan init' to create one.");
    };
    let report = build(project_dir, manifest)?;
    report::print(&report, format, list_sources)
}
