//! CPU to port mapping table.

use std::collections::HashSet;

use fwplan_core::{PlanError, Result};
use serde::{Deserialize, Serialize};

/// A flag that must reach both the compiler and the linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlagPair {
    pub compiler: String,
    pub linker: String,
}

impl FlagPair {
    /// The same flag for compiler and linker.
    pub fn both(flag: &str) -> Self {
        Self {
            compiler: flag.into(),
            linker: flag.into(),
        }
    }
}

/// The port used for one CPU core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortEntry {
    /// CPU identifier as reported by the board (e.g., "cortex-m4").
    pub cpu: String,
    /// Port directory below the portable directory (e.g., "ARM_CM4F").
    pub port_path: String,
    /// Whether the port's assembly needs the unified-syntax flag.
    #[serde(default)]
    pub needs_asm_fixup: bool,
    /// Floating-point ABI flags for cores with a hardware FPU.
    #[serde(default)]
    pub extra_flags: Vec<FlagPair>,
}

/// Optional compatibility layer enabled by a define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShimLayer {
    /// Define that enables the layer.
    pub define: String,
    /// Directory of the layer, relative to the source directory.
    pub dir: String,
}

/// Static mapping from CPU identifier to kernel port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortTable {
    /// Library name used in messages.
    pub library: String,
    /// Source directory relative to the library root; include paths live under it.
    #[serde(default)]
    pub source_dir: String,
    /// Directory holding every port, relative to the source directory.
    pub portable_dir: String,
    /// Files that are never compiled.
    #[serde(default)]
    pub excluded_files: Vec<String>,
    /// Compiler flag added for ports with `needs-asm-fixup`.
    #[serde(default)]
    pub asm_fixup_flag: String,
    /// Compatibility layer, if the library ships one.
    #[serde(default)]
    pub shim: Option<ShimLayer>,
    /// Known ports, keyed by CPU identifier.
    #[serde(rename = "port")]
    pub ports: Vec<PortEntry>,
}

impl PortTable {
    /// Look up the port for `cpu`.
    pub fn port(&self, cpu: &str) -> Option<&PortEntry> {
        self.ports.iter().find(|p| p.cpu == cpu)
    }

    /// All CPU identifiers in table order.
    pub fn cpu_ids(&self) -> Vec<String> {
        self.ports.iter().map(|p| p.cpu.clone()).collect()
    }

    /// Join `rel` onto the source directory.
    pub fn source_path(&self, rel: &str) -> String {
        let rel = rel.trim_end_matches('/');
        match self.source_dir.trim_end_matches('/') {
            "" => rel.to_string(),
            dir => format!("{dir}/{rel}"),
        }
    }

    /// Check that CPU identifiers are unique and every port names a directory.
    pub fn validate(&self) -> Result<()> {
        if self.portable_dir.is_empty() {
            return Err(PlanError::Validation {
                detail: format!("{}: portable-dir is empty", self.library),
            });
        }
        let mut seen = HashSet::new();
        for port in &self.ports {
            if !seen.insert(port.cpu.as_str()) {
                return Err(PlanError::DuplicateEntry {
                    kind: "target",
                    key: port.cpu.clone(),
                });
            }
            if port.port_path.is_empty() {
                return Err(PlanError::Validation {
                    detail: format!("target '{}' has an empty port-path", port.cpu),
                });
            }
        }
        if self.ports.iter().any(|p| p.needs_asm_fixup) && self.asm_fixup_flag.is_empty() {
            return Err(PlanError::Validation {
                detail: "a port needs the assembler fixup but asm-fixup-flag is empty".into(),
            });
        }
        Ok(())
    }

    /// FreeRTOS as vendored for GD32 boards.
    ///
    /// Every GD32 Cortex-M4 part has an FPU. The MPU and TrustZone port
    /// variants are never used.
    pub fn freertos() -> Self {
        let softfp = FlagPair::both("-mfloat-abi=softfp");
        Self {
            library: "FreeRTOS".into(),
            source_dir: "src".into(),
            portable_dir: "portable".into(),
            excluded_files: vec!["mpu_wrappers.c".into()],
            asm_fixup_flag: "-masm-syntax-unified".into(),
            shim: Some(ShimLayer {
                define: "PIO_FREERTOS_WITH_CMSISOS2".into(),
                dir: "cmsis_os2".into(),
            }),
            ports: vec![
                PortEntry {
                    cpu: "cortex-m3".into(),
                    port_path: "ARM_CM3".into(),
                    needs_asm_fixup: false,
                    extra_flags: Vec::new(),
                },
                PortEntry {
                    cpu: "cortex-m4".into(),
                    port_path: "ARM_CM4F".into(),
                    needs_asm_fixup: false,
                    extra_flags: vec![FlagPair::both("-mfpu=fpv4-sp-d16"), softfp.clone()],
                },
                PortEntry {
                    cpu: "cortex-m23".into(),
                    port_path: "ARM_CM23_NTZ/non_secure".into(),
                    needs_asm_fixup: true,
                    extra_flags: Vec::new(),
                },
                PortEntry {
                    cpu: "cortex-m33".into(),
                    port_path: "ARM_CM33_NTZ/non_secure".into(),
                    needs_asm_fixup: true,
                    extra_flags: vec![FlagPair::both("-mfpu=fp-armv8"), softfp],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freertos_table_is_valid() {
        let table = PortTable::freertos();
        assert!(table.validate().is_ok());
        assert_eq!(
            table.cpu_ids(),
            ["cortex-m3", "cortex-m4", "cortex-m23", "cortex-m33"]
        );
    }

    #[test]
    fn lookup_by_cpu() {
        let table = PortTable::freertos();
        assert_eq!(table.port("cortex-m4").unwrap().port_path, "ARM_CM4F");
        assert!(table.port("cortex-m4").unwrap().extra_flags.len() == 2);
        assert!(table.port("cortex-m23").unwrap().needs_asm_fixup);
        assert!(table.port("riscv").is_none());
    }

    #[test]
    fn source_path_prefix() {
        let mut table = PortTable::freertos();
        assert_eq!(table.source_path("cmsis_os2"), "src/cmsis_os2");
        assert_eq!(table.source_path("cmsis_os2/"), "src/cmsis_os2");
        table.source_dir = String::new();
        assert_eq!(table.source_path("cmsis_os2"), "cmsis_os2");
    }

    #[test]
    fn duplicate_cpu_rejected() {
        let mut table = PortTable::freertos();
        let dup = table.ports[0].clone();
        table.ports.push(dup);
        assert!(matches!(
            table.validate(),
            Err(PlanError::DuplicateEntry { kind: "target", .. })
        ));
    }

    #[test]
    fn empty_port_path_rejected() {
        let mut table = PortTable::freertos();
        table.ports[1].port_path.clear();
        assert!(matches!(table.validate(), Err(PlanError::Validation { .. })));
    }

    #[test]
    fn asm_fixup_needs_flag() {
        let mut table = PortTable::freertos();
        table.asm_fixup_flag.clear();
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("asm-fixup-flag"));
    }
}
