//! # candypack
//!
//! Command-line tool that builds, tests and packages the Candy library for
//! every target framework.
//!
//! ## Quick Start
//!
//! ```bash
//! # From the build/ directory
//! candypack pack
//!
//! # Show what would run without touching anything
//! candypack pack --dry-run
//!
//! # Write a starter config with every default spelled out
//! candypack init
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pack` | Build, test and copy every target, then create the package |
//! | `version` | Print the version the package would get |
//! | `targets` | List the configured build targets |
//! | `init` | Write a starter `candypack.toml` |
//!
//! Running without a command prints the available commands and exits 0.
//!
//! ## Output Directory
//!
//! ```text
//! lib/
//! ├── net35/   # Candy.dll, Candy.xml
//! ├── net40/
//! └── net45/
//! ```
//!
//! ## Exit Codes
//!
//! - `0` - success, or no command given
//! - `1` - a build, test or package step failed (reported as `[!] ...` on
//!   stdout), or any other error (reported as `error: ...` on stderr)
//! - `2` - unrecognized command or arguments

use anyhow::{Context, Result, bail};
use candypack_sdk::{PackError, PackReport, Pipeline};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub mod config;

use config::{CONFIG_FILE_NAME, CandypackConfig, ConfigResolver};

/// Printed when no command is given.
pub const USAGE_HINT: &str = "Available commands: pack, version, targets, init";

/// Build, test and pack the Candy library for every target framework.
#[derive(Parser, Debug)]
#[command(name = "candypack", author, version, about = "Multi-framework build and NuGet pack orchestrator", long_about = None)]
pub struct Cli {
    /// Path to candypack.toml (default: discovered from the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log tool command lines and resolved paths
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build, test and copy every target, then create the package.
    Pack {
        #[arg(long, help = "Print tool invocations and copies without running them")]
        dry_run: bool,
        #[arg(long, help = "Write a JSON run summary to this path")]
        summary: Option<PathBuf>,
    },
    /// Print the package version read from the version file.
    Version,
    /// List the configured build targets in build order.
    Targets,
    /// Write a starter config file.
    Init {
        #[arg(long, default_value = CONFIG_FILE_NAME)]
        output: PathBuf,
    },
}

/// Parses the command line and runs the selected command.
pub fn run() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();
    if is_empty_command(&args) {
        println!("{}", USAGE_HINT);
        return Ok(());
    }

    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{}", USAGE_HINT);
        return Ok(());
    };

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    match command {
        Command::Pack { dry_run, summary } => {
            let resolver = ConfigResolver::load(cli.config.as_deref(), &cwd)?;
            cmd_pack(&resolver, dry_run, summary.as_deref())
        }
        Command::Version => {
            let resolver = ConfigResolver::load(cli.config.as_deref(), &cwd)?;
            cmd_version(&resolver)
        }
        Command::Targets => {
            let resolver = ConfigResolver::load(cli.config.as_deref(), &cwd)?;
            cmd_targets(&resolver)
        }
        Command::Init { output } => cmd_init(&output),
    }
}

/// An empty first argument names no command, same as giving none.
fn is_empty_command(args: &[OsString]) -> bool {
    args.get(1).is_some_and(|arg| arg.is_empty())
}

/// Prints a failure the way the exit-code contract describes.
///
/// Step failures get the one-line `[!]` diagnostic on stdout; everything
/// else goes to stderr with its full context chain.
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<PackError>() {
        Some(pack_err) if pack_err.is_step_failure() => println!("[!] {}", pack_err),
        _ => eprintln!("error: {:#}", err),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

fn cmd_pack(resolver: &ConfigResolver, dry_run: bool, summary: Option<&Path>) -> Result<()> {
    if let Some(config_path) = &resolver.config_path {
        println!("Using config file: {:?}", config_path);
    }
    let layout = resolver.layout()?;

    println!("Packing {} target(s)...", layout.targets().len());
    println!("  Root: {:?}", layout.root);
    if dry_run {
        println!("  Mode: dry-run (no changes will be made)");
    }

    let report = Pipeline::new(layout).dry_run(dry_run).run_pack()?;

    match summary {
        Some(path) if dry_run => println!("  [dry-run] would write run summary to {:?}", path),
        Some(path) => write_summary(&report, path)?,
        None => {}
    }

    if dry_run {
        println!("\n[dry-run] Pack simulation completed. No changes were made.");
    } else {
        println!("\n✓ Package {} created!", report.version);
        for target in &report.targets {
            println!("  {}: {} file(s)", target.framework, target.artifacts.len());
        }
    }
    Ok(())
}

fn cmd_version(resolver: &ConfigResolver) -> Result<()> {
    let layout = resolver.layout()?;
    let version = candypack_sdk::read_version(&layout.resolve(&layout.version_file))?;
    println!("{}", version);
    Ok(())
}

fn cmd_targets(resolver: &ConfigResolver) -> Result<()> {
    let layout = resolver.layout()?;
    for (i, target) in layout.targets().iter().enumerate() {
        println!(
            "{}. {} -> {}",
            i + 1,
            target.solution,
            target.output_dir(&layout.output_dir).display()
        );
    }
    Ok(())
}

fn cmd_init(output: &Path) -> Result<()> {
    ensure_can_write(output)?;
    write_file(output, CandypackConfig::generate_starter_toml().as_bytes())?;
    println!("Wrote starter config to {:?}", output);
    Ok(())
}

fn write_summary(report: &PackReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    ensure_parent_dir(path)?;
    write_file(path, json.as_bytes())?;
    println!("Wrote run summary to {:?}", path);
    Ok(())
}

fn ensure_can_write(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("refusing to overwrite existing file: {:?}", path);
    }
    ensure_parent_dir(path)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {:?}", parent))?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing file {:?}", path))
}
