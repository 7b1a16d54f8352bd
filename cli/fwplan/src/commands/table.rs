//! `fwplan table` — inspect and export mapping tables.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use fwplan_kernel::parse::port_table_to_toml;
use fwplan_kernel::PortTable;
use fwplan_usb::parse::feature_table_to_toml;
use fwplan_usb::{FeatureTable, Role};

use crate::manifest::{self, FwplanManifest};

/// Which library's table to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LibraryKind {
    Kernel,
    Usb,
}

fn kernel_table(project_dir: &Path, manifest: Option<&FwplanManifest>) -> Result<PortTable> {
    manifest::port_table(project_dir, manifest.and_then(|m| m.kernel.as_ref()))
}

fn usb_table(project_dir: &Path, manifest: Option<&FwplanManifest>) -> Result<FeatureTable> {
    manifest::feature_table(project_dir, manifest.and_then(|m| m.usb.as_ref()))
}

/// List the CPU identifiers and feature flags the project's tables know.
pub fn list(project_dir: &Path, manifest: Option<&FwplanManifest>) -> Result<()> {
    let kernel = kernel_table(project_dir, manifest)?;
    let usb = usb_table(project_dir, manifest)?;
    print!("{}", render_list(&kernel, &usb));
    println!();
    println!("Use 'fwplan table show <kernel|usb>' for details.");
    Ok(())
}

pub(crate) fn render_list(kernel: &PortTable, usb: &FeatureTable) -> String {
    let mut out = format!("{} targets:\n", kernel.library);
    for port in &kernel.ports {
        out.push_str(&format!("  {:<25} {}\n", port.cpu, port.port_path));
    }
    out.push_str(&format!("\n{} feature flags:\n", usb.library));
    for entry in &usb.features {
        out.push_str(&format!(
            "  {:<35} {} class '{}'\n",
            entry.flag, entry.role, entry.class
        ));
    }
    out
}

/// Describe one table in detail.
pub fn show(project_dir: &Path, manifest: Option<&FwplanManifest>, kind: LibraryKind) -> Result<()> {
    match kind {
        LibraryKind::Kernel => show_kernel(&kernel_table(project_dir, manifest)?),
        LibraryKind::Usb => show_usb(&usb_table(project_dir, manifest)?),
    }
    Ok(())
}

fn show_kernel(table: &PortTable) {
    println!("=== {} ===", table.library);
    println!("Source dir:   {}", table.source_dir);
    println!("Portable dir: {}", table.portable_dir);
    println!("Never built:  {}", table.excluded_files.join(", "));
    if let Some(shim) = &table.shim {
        println!("Shim layer:   {} (enabled by {})", shim.dir, shim.define);
    }
    println!();
    for port in &table.ports {
        println!("--- {} ---", port.cpu);
        println!("  Port: {}", port.port_path);
        for pair in &port.extra_flags {
            println!("  Flag: {} (linker: {})", pair.compiler, pair.linker);
        }
        if port.needs_asm_fixup {
            println!("  Flag: {} (compiler only)", table.asm_fixup_flag);
        }
    }
}

fn show_usb(table: &FeatureTable) {
    println!("=== {} ===", table.library);
    println!("Driver sources: {}", table.driver_source_dir);
    println!("Define:         {}", table.full_speed_define);
    for role in [Role::Device, Role::Host] {
        println!();
        println!("--- {role} ---");
        println!("  Core: {}", table.core_source_dir(role));
        println!("  Driver files: {}", table.driver_files(role).join(", "));
        for entry in table.features_for(role) {
            println!("  {:<35} {}", entry.flag, entry.source_dir());
            for file in &entry.special_excludes {
                println!("    excludes {file}");
            }
        }
    }
}

/// Print a table as TOML, or write it to `output`.
pub fn export(
    project_dir: &Path,
    manifest: Option<&FwplanManifest>,
    kind: LibraryKind,
    output: Option<&Path>,
) -> Result<()> {
    let toml_str = match kind {
        LibraryKind::Kernel => port_table_to_toml(&kernel_table(project_dir, manifest)?)?,
        LibraryKind::Usb => feature_table_to_toml(&usb_table(project_dir, manifest)?)?,
    };
    match output {
        Some(path) => {
            std::fs::write(path, &toml_str)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{toml_str}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::LibraryConfig;
    use fwplan_core::HardwareDescriptor;
    use fwplan_kernel::parse::load_port_table;
    use fwplan_usb::parse::load_feature_table;

    #[test]
    fn list_includes_builtins() {
        let text = render_list(&PortTable::freertos(), &FeatureTable::gd32_usbfs());
        assert!(text.contains("cortex-m23"));
        assert!(text.contains("ARM_CM33_NTZ/non_secure"));
        assert!(text.contains("PIO_USBFS_HOST_MSC"));
    }

    #[test]
    fn export_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let kernel_path = dir.path().join("kernel.toml");
        let usb_path = dir.path().join("usb.toml");
        export(dir.path(), None, LibraryKind::Kernel, Some(&kernel_path)).unwrap();
        export(dir.path(), None, LibraryKind::Usb, Some(&usb_path)).unwrap();
        assert_eq!(load_port_table(&kernel_path).unwrap(), PortTable::freertos());
        assert_eq!(load_feature_table(&usb_path).unwrap(), FeatureTable::gd32_usbfs());
    }

    #[test]
    fn show_builtin_tables() {
        let dir = tempfile::tempdir().unwrap();
        assert!(show(dir.path(), None, LibraryKind::Kernel).is_ok());
        assert!(show(dir.path(), None, LibraryKind::Usb).is_ok());
    }

    #[test]
    fn broken_usb_override_does_not_block_kernel_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("usb.toml"), "not a table [[[").unwrap();
        let manifest = FwplanManifest {
            board: HardwareDescriptor::new("cortex-m4"),
            kernel: None,
            usb: Some(LibraryConfig {
                root: "lib/usb".into(),
                table: Some("usb.toml".into()),
            }),
        };
        let out = dir.path().join("kernel.toml");
        assert!(show(dir.path(), Some(&manifest), LibraryKind::Kernel).is_ok());
        export(dir.path(), Some(&manifest), LibraryKind::Kernel, Some(&out)).unwrap();
        assert_eq!(load_port_table(&out).unwrap(), PortTable::freertos());
        assert!(show(dir.path(), Some(&manifest), LibraryKind::Usb).is_err());
    }
}
