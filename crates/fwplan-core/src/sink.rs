//! Environment sinks and plan broadcast.
//!
//! A build plan is applied to several sinks at once: the library's own
//! build scope and the global scope shared by the application and every
//! other library. All sinks receive include paths, flags, and defines
//! identically. Only library-scoped sinks receive the source filter.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::FilterRule;
use crate::plan::BuildPlan;

/// Which part of the build a sink configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// The vendored library's own compilation.
    Library,
    /// Every compilation unit of the build.
    Global,
}

/// Receiver of a resolved build plan.
pub trait EnvironmentSink {
    fn scope(&self) -> Scope;

    /// Replace the set of files compiled for this scope.
    fn replace_source_filter(&mut self, rules: &[FilterRule]);

    fn append_include_paths(&mut self, paths: &[PathBuf]);

    fn append_compiler_flags(&mut self, flags: &[String]);

    fn append_linker_flags(&mut self, flags: &[String]);

    fn append_defines(&mut self, defines: &[String]);
}

impl BuildPlan {
    /// Apply the plan to every sink in `sinks`.
    ///
    /// Include paths are resolved against `root` before any sink is
    /// touched, so an error leaves all sinks unchanged.
    pub fn apply(&self, root: &Path, sinks: &mut [&mut dyn EnvironmentSink]) -> Result<()> {
        let include_paths = self.resolve_include_paths(root)?;
        let defines: Vec<String> = self.defines.iter().cloned().collect();

        for sink in sinks.iter_mut() {
            log::debug!("{}: applying plan to {:?} scope", self.library, sink.scope());
            if sink.scope() == Scope::Library {
                sink.replace_source_filter(self.filter.rules());
            }
            sink.append_include_paths(&include_paths);
            sink.append_compiler_flags(&self.compiler_flags);
            sink.append_linker_flags(&self.linker_flags);
            sink.append_defines(&defines);
        }
        Ok(())
    }
}

/// In-memory sink that records what was applied to it.
///
/// Include paths and defines are de-duplicated on append; flags are kept
/// in the order they arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordingSink {
    pub scope: Scope,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub source_filter: Vec<FilterRule>,
    pub include_paths: Vec<PathBuf>,
    pub compiler_flags: Vec<String>,
    pub linker_flags: Vec<String>,
    pub defines: Vec<String>,
}

impl RecordingSink {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            source_filter: Vec::new(),
            include_paths: Vec::new(),
            compiler_flags: Vec::new(),
            linker_flags: Vec::new(),
            defines: Vec::new(),
        }
    }

    pub fn library() -> Self {
        Self::new(Scope::Library)
    }

    pub fn global() -> Self {
        Self::new(Scope::Global)
    }
}

impl EnvironmentSink for RecordingSink {
    fn scope(&self) -> Scope {
        self.scope
    }

    fn replace_source_filter(&mut self, rules: &[FilterRule]) {
        self.source_filter = rules.to_vec();
    }

    fn append_include_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            if !self.include_paths.contains(path) {
                self.include_paths.push(path.clone());
            }
        }
    }

    fn append_compiler_flags(&mut self, flags: &[String]) {
        self.compiler_flags.extend_from_slice(flags);
    }

    fn append_linker_flags(&mut self, flags: &[String]) {
        self.linker_flags.extend_from_slice(flags);
    }

    fn append_defines(&mut self, defines: &[String]) {
        for define in defines {
            if !self.defines.contains(define) {
                self.defines.push(define.clone());
            }
        }
    }
}
