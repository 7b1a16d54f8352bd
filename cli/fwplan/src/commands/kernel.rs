//! `fwplan kernel` — resolve the kernel port for one CPU.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use fwplan_core::HardwareDescriptor;
use fwplan_kernel::parse::load_port_table;
use fwplan_kernel::{resolve_port, PortTable};

use crate::commands::report::{self, Resolved};
use crate::commands::{descriptor, LibraryArgs};
use crate::manifest::{self, FwplanManifest};

/// Resolve the kernel plan from the manifest and command-line overrides.
pub fn resolve(
    project_dir: &Path,
    manifest: Option<&FwplanManifest>,
    args: &LibraryArgs,
) -> Result<Resolved> {
    let descriptor = descriptor(manifest, args);
    if descriptor.cpu.is_empty() {
        bail!("no CPU given. Pass --cpu or set `board.cpu` in fwplan.toml.");
    }

    let config = manifest.and_then(|m| m.kernel.as_ref());
    let table = match &args.table {
        Some(path) => load_port_table(path)?,
        None => manifest::port_table(project_dir, config)?,
    };
    let root = library_root(project_dir, args.root.as_deref(), config.map(|c| c.root.as_path()));
    resolved(&descriptor, &table, root)
}

pub(crate) fn resolved(
    descriptor: &HardwareDescriptor,
    table: &PortTable,
    root: PathBuf,
) -> Result<Resolved> {
    let plan = resolve_port(descriptor, table)?;
    Ok(Resolved {
        plan,
        root,
        source_dir: PathBuf::from(&table.source_dir),
    })
}

/// `--root` wins, then the manifest's root, then the project directory itself.
pub(crate) fn library_root(
    project_dir: &Path,
    arg: Option<&Path>,
    configured: Option<&Path>,
) -> PathBuf {
    match (arg, configured) {
        (Some(root), _) => root.to_path_buf(),
        (None, Some(root)) => project_dir.join(root),
        (None, None) => project_dir.to_path_buf(),
    }
}

/// Resolve and print the kernel plan.
pub fn run(project_dir: &Path, manifest: Option<&FwplanManifest>, args: &LibraryArgs) -> Result<()> {
    let resolved = resolve(project_dir, manifest, args)?;
    let report = report::assemble(vec![resolved])?;
    report::print(&report, args.format, args.list_sources)
}
