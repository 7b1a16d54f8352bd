//! TOML loading and serialization for feature tables.

use std::path::Path;

use fwplan_core::{PlanError, Result};

use crate::table::FeatureTable;

/// Load and validate a feature table from a file.
pub fn load_feature_table(path: &Path) -> Result<FeatureTable> {
    if !path.exists() {
        return Err(PlanError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_feature_table(&content)
}

/// Parse and validate a feature table from a TOML string.
pub fn parse_feature_table(toml_str: &str) -> Result<FeatureTable> {
    let table: FeatureTable = toml::from_str(toml_str)?;
    table.validate()?;
    Ok(table)
}

/// Serialize a feature table to pretty TOML.
pub fn feature_table_to_toml(table: &FeatureTable) -> Result<String> {
    Ok(toml::to_string_pretty(table)?)
}
