//! TOML loading and serialization for port tables.
//!
//! A project may replace the built-in table with its own `.toml` file,
//! for example to add a port the built-in table does not know.

use std::path::Path;

use fwplan_core::{PlanError, Result};

use crate::table::PortTable;

/// Load and validate a port table from a file.
pub fn load_port_table(path: &Path) -> Result<PortTable> {
    if !path.exists() {
        return Err(PlanError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_port_table(&content)
}

/// Parse and validate a port table from a TOML string.
pub fn parse_port_table(toml_str: &str) -> Result<PortTable> {
    let table: PortTable = toml::from_str(toml_str)?;
    table.validate()?;
    Ok(table)
}

/// Serialize a port table to pretty TOML.
pub fn port_table_to_toml(table: &PortTable) -> Result<String> {
    Ok(toml::to_string_pretty(table)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_freertos() {
        let original = PortTable::freertos();
        let toml_str = port_table_to_toml(&original).unwrap();
        let parsed = parse_port_table(&toml_str).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn parse_minimal_table() {
        let toml_str = r#"
library = "FreeRTOS"
portable-dir = "portable"

[[port]]
cpu = "cortex-m0plus"
port-path = "ARM_CM0"
"#;
        let table = parse_port_table(toml_str).unwrap();
        assert_eq!(table.ports.len(), 1);
        assert!(table.shim.is_none());
        assert!(table.excluded_files.is_empty());
        assert_eq!(table.source_path("portable/ARM_CM0"), "portable/ARM_CM0");
    }

    #[test]
    fn parse_rejects_duplicate_cpu() {
        let toml_str = r#"
library = "FreeRTOS"
portable-dir = "portable"

[[port]]
cpu = "cortex-m3"
port-path = "ARM_CM3"

[[port]]
cpu = "cortex-m3"
port-path = "ARM_CM3_MPU"
"#;
        assert!(matches!(
            parse_port_table(toml_str),
            Err(PlanError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn parse_invalid_returns_error() {
        assert!(matches!(
            parse_port_table("this is not valid toml [[["),
            Err(PlanError::Toml(_))
        ));
    }

    #[test]
    fn load_not_found() {
        let result = load_port_table(Path::new("/nonexistent/freertos.toml"));
        assert!(matches!(result, Err(PlanError::NotFound { .. })));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("freertos.toml");
        std::fs::write(&path, port_table_to_toml(&PortTable::freertos()).unwrap()).unwrap();
        let table = load_port_table(&path).unwrap();
        assert_eq!(table.library, "FreeRTOS");
    }
}
