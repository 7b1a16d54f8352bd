//! Build plan produced by a resolver.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::SourceFilter;

/// Insertion-ordered set of library-relative include directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncludePaths {
    paths: Vec<String>,
}

impl IncludePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A non-fatal condition noticed during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// A define in the table's namespace that the table does not map.
    UnknownFeatureFlag { flag: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFeatureFlag { flag } => {
                write!(f, "unknown feature flag '{flag}' ignored")
            }
        }
    }
}

/// The static build plan for one library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildPlan {
    /// Library the plan configures.
    pub library: String,
    /// Which files of the library are compiled.
    pub filter: SourceFilter,
    /// Include directories, relative to the library root.
    pub include_paths: IncludePaths,
    /// Extra compiler flags, in order.
    pub compiler_flags: Vec<String>,
    /// Extra linker flags, in order.
    pub linker_flags: Vec<String>,
    /// Extra preprocessor defines.
    pub defines: BTreeSet<String>,
    /// Non-fatal conditions noticed during resolution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl BuildPlan {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            ..Self::default()
        }
    }

    pub fn add_include_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        log::debug!("{}: include path {path}", self.library);
        self.include_paths.insert(path);
    }

    /// Append a compiler flag. Flags already present are not repeated.
    pub fn add_compiler_flag(&mut self, flag: &str) {
        if !self.compiler_flags.iter().any(|f| f == flag) {
            self.compiler_flags.push(flag.into());
        }
    }

    /// Append a linker flag. Flags already present are not repeated.
    pub fn add_linker_flag(&mut self, flag: &str) {
        if !self.linker_flags.iter().any(|f| f == flag) {
            self.linker_flags.push(flag.into());
        }
    }

    pub fn add_define(&mut self, define: impl Into<String>) {
        self.defines.insert(define.into());
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{}: {warning}", self.library);
        self.warnings.push(warning);
    }

    /// Include directories as absolute paths under `root`.
    ///
    /// The filesystem is not consulted; a relative `root` is made absolute
    /// against the current directory.
    pub fn resolve_include_paths(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = std::path::absolute(root)?;
        Ok(self
            .include_paths
            .iter()
            .map(|rel| rel.split('/').fold(root.clone(), |acc, part| acc.join(part)))
            .collect())
    }
}
