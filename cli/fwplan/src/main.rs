//! fwplan — build plan resolver for vendored firmware libraries.

mod commands;
mod logger;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use commands::report::OutputFormat;
use commands::table::LibraryKind;
use commands::LibraryArgs;
use manifest::FwplanManifest;

#[derive(Parser)]
#[command(
    name = "fwplan",
    version,
    about = "Resolve source filters, include paths, and flags for vendored firmware libraries"
)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fwplan.toml in the current directory
    Init {
        /// CPU core of the board
        #[arg(long, default_value = "cortex-m4")]
        cpu: String,
        /// Overwrite an existing fwplan.toml
        #[arg(long)]
        force: bool,
    },
    /// Resolve the kernel port for a CPU
    Kernel(LibraryArgs),
    /// Resolve the USB stack classes for a set of defines
    Usb(LibraryArgs),
    /// Resolve every library configured in fwplan.toml
    Plan {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// List the library files each source filter selects
        #[arg(long)]
        list_sources: bool,
    },
    /// Inspect mapping tables
    Table {
        #[command(subcommand)]
        action: TableAction,
    },
}

#[derive(Subcommand)]
enum TableAction {
    /// List known CPU identifiers and feature flags
    List,
    /// Show one table in detail
    Show {
        #[arg(value_enum)]
        library: LibraryKind,
    },
    /// Print one table as TOML
    Export {
        #[arg(value_enum)]
        library: LibraryKind,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { cpu, force } => commands::init::run(&cwd, &cpu, force),

        Commands::Kernel(args) => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::kernel::run(&project_dir, manifest.as_ref(), &args)
        }

        Commands::Usb(args) => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::usb::run(&project_dir, manifest.as_ref(), &args)
        }

        Commands::Plan {
            format,
            list_sources,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::plan::run(&project_dir, manifest.as_ref(), format, list_sources)
        }

        Commands::Table { action } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            match action {
                TableAction::List => commands::table::list(&project_dir, manifest.as_ref()),
                TableAction::Show { library } => {
                    commands::table::show(&project_dir, manifest.as_ref(), library)
                }
                TableAction::Export { library, output } => commands::table::export(
                    &project_dir,
                    manifest.as_ref(),
                    library,
                    output.as_deref(),
                ),
            }
        }
    }
}

fn load_manifest_optional(
    cwd: &Path,
) -> anyhow::Result<(Option<FwplanManifest>, Option<PathBuf>)> {
    match FwplanManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}
