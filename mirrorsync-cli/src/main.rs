//! mirrorsync: mirror a repository subtree through a generative model.
//!
//! # Usage
//!
//! ```text
//! mirrorsync sync [--dry-run] [--jobs N] [--output-dir DIR] [--json]
//! mirrorsync plan [--json]
//! mirrorsync status [--json]
//! mirrorsync config
//! ```
//!
//! Global flags: `--config <path>`, `--verbose`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, plan::PlanArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mirrorsync",
    version,
    about = "Incrementally transform changed repository files with a generative model",
    long_about = None,
)]
struct Cli {
    /// Config file (default: ./mirrorsync.yaml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List, diff, transform changed files, write outputs, commit fingerprints.
    Sync(SyncArgs),

    /// Show which files the next sync would transform.
    Plan(PlanArgs),

    /// Show tracked files and whether their outputs exist locally.
    Status(StatusArgs),

    /// Print the resolved configuration with credentials redacted.
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Sync(args) => args.run(config_path),
        Commands::Plan(args) => args.run(config_path),
        Commands::Status(args) => args.run(config_path),
        Commands::Config(args) => args.run(config_path),
    }
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
