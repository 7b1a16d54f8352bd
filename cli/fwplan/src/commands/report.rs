//! Applying resolved plans to sinks and printing the result.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use fwplan_core::{BuildPlan, RecordingSink};
use serde::Serialize;

/// Output format for plan reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A resolved plan and where its library lives.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub plan: BuildPlan,
    /// Library root; include paths are resolved against it.
    pub root: PathBuf,
    /// Directory the source filter patterns are relative to.
    pub source_dir: PathBuf,
}

/// One library after its plan was applied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LibraryReport {
    pub plan: BuildPlan,
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub environment: RecordingSink,
}

/// Every library's environment plus the shared global environment.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub libraries: Vec<LibraryReport>,
    pub global: RecordingSink,
}

/// Apply each plan to its own library sink and to one shared global sink.
pub fn assemble(resolved: Vec<Resolved>) -> Result<PlanReport> {
    let mut global = RecordingSink::global();
    let mut libraries = Vec::with_capacity(resolved.len());
    for r in resolved {
        let mut environment = RecordingSink::library();
        r.plan
            .apply(&r.root, &mut [&mut environment, &mut global])
            .with_context(|| format!("applying plan for {}", r.plan.library))?;
        libraries.push(LibraryReport {
            plan: r.plan,
            root: r.root,
            source_dir: r.source_dir,
            environment,
        });
    }
    Ok(PlanReport { libraries, global })
}

/// Print a report to stdout.
pub fn print(report: &PlanReport, format: OutputFormat, list_sources: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            print!("{}", render_text(report));
        }
    }
    if list_sources {
        for lib in &report.libraries {
            println!();
            println!("--- Selected sources: {} ---", lib.plan.library);
            for file in selected_sources(lib)? {
                println!("  {file}");
            }
        }
    }
    Ok(())
}

/// Human-readable rendering of a report.
pub fn render_text(report: &PlanReport) -> String {
    let mut out = String::new();
    for lib in &report.libraries {
        let env = &lib.environment;
        let _ = writeln!(out, "=== {} ===", lib.plan.library);
        let _ = writeln!(out, "Root: {}", lib.root.display());
        section(&mut out, "Source filter", env.source_filter.iter());
        section(
            &mut out,
            "Include paths",
            env.include_paths.iter().map(|p| p.display()),
        );
        section(&mut out, "Compiler flags", env.compiler_flags.iter());
        section(&mut out, "Linker flags", env.linker_flags.iter());
        section(&mut out, "Defines", env.defines.iter());
        if !lib.plan.warnings.is_empty() {
            section(&mut out, "Warnings", lib.plan.warnings.iter());
        }
        out.push('\n');
    }
    if report.libraries.len() > 1 {
        let global = &report.global;
        let _ = writeln!(out, "=== Global environment ===");
        section(
            &mut out,
            "Include paths",
            global.include_paths.iter().map(|p| p.display()),
        );
        section(&mut out, "Compiler flags", global.compiler_flags.iter());
        section(&mut out, "Linker flags", global.linker_flags.iter());
        section(&mut out, "Defines", global.defines.iter());
    }
    out
}

fn section<I, T>(out: &mut String, title: &str, items: I)
where
    I: Iterator<Item = T>,
    T: std::fmt::Display,
{
    let _ = writeln!(out, "--- {title} ---");
    let mut empty = true;
    for item in items {
        let _ = writeln!(out, "  {item}");
        empty = false;
    }
    if empty {
        let _ = writeln!(out, "  (none)");
    }
}

/// Library source files the plan's filter selects, relative to the source directory.
pub fn selected_sources(lib: &LibraryReport) -> Result<Vec<String>> {
    let dir = lib.root.join(&lib.source_dir);
    let files = source_files(&dir).with_context(|| format!("scanning {}", dir.display()))?;
    Ok(lib
        .plan
        .filter
        .select(files.iter().map(String::as_str))
        .into_iter()
        .map(str::to_string)
        .collect())
}

const SOURCE_EXTENSIONS: [&str; 6] = ["c", "cc", "cpp", "s", "S", "asm"];

/// Every compilable file under `dir`, as sorted `/`-separated relative paths.
pub fn source_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect(dir, "", &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect(dir: &Path, prefix: &str, files: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let rel = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        if path.is_dir() {
            collect(&path, &rel, files)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
        {
            files.push(rel);
        }
    }
    Ok(())
}
