pub mod init;
pub mod kernel;
pub mod plan;
pub mod report;
pub mod table;
pub mod usb;

use std::path::PathBuf;

use clap::Args;
use fwplan_core::HardwareDescriptor;

use crate::manifest::FwplanManifest;
use report::OutputFormat;

/// Arguments shared by the single-library commands.
#[derive(Args, Debug, Clone)]
pub struct LibraryArgs {
    /// CPU core (overrides `board.cpu` from fwplan.toml)
    #[arg(long)]
    pub cpu: Option<String>,
    /// Active define, may be repeated (added to `board.defines`)
    #[arg(short = 'D', long = "define")]
    pub defines: Vec<String>,
    /// Library root directory
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Mapping table file replacing the built-in table
    #[arg(long)]
    pub table: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// List the library files the source filter selects
    #[arg(long)]
    pub list_sources: bool,
}

/// Merge the manifest board with command-line overrides.
pub fn descriptor(manifest: Option<&FwplanManifest>, args: &LibraryArgs) -> HardwareDescriptor {
    let mut descriptor = manifest.map(|m| m.board.clone()).unwrap_or_default();
    if let Some(cpu) = &args.cpu {
        descriptor.cpu = cpu.clone();
    }
    descriptor.with_defines(args.defines.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn args() -> LibraryArgs {
        LibraryArgs {
            cpu: None,
            defines: Vec::new(),
            root: None,
            table: None,
            format: OutputFormat::Text,
            list_sources: false,
        }
    }

    #[test]
    fn command_line_overrides_manifest() {
        let manifest: FwplanManifest =
            toml::from_str("[board]\ncpu = \"cortex-m3\"\ndefines = [\"A\"]\n").unwrap();
        let mut a = args();
        a.cpu = Some("cortex-m4".into());
        a.defines = vec!["B".into()];
        let d = descriptor(Some(&manifest), &a);
        assert_eq!(d.cpu, "cortex-m4");
        assert!(d.has_define("A"));
        assert!(d.has_define("B"));
    }

    #[test]
    fn no_manifest_uses_arguments_only() {
        let mut a = args();
        a.defines = vec!["PIO_USBFS_HOST_MSC".into()];
        let d = descriptor(None, &a);
        assert!(d.cpu.is_empty());
        assert_eq!(d.defines.len(), 1);
    }
}
