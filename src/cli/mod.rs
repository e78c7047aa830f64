// CLI - Command Line Interface for the Qearn state migration
// Principle: One batch run, explicit paths, nothing interactive

pub mod config;
pub mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// State file name the contract uses for this snapshot
pub const DEFAULT_STATE_FILE: &str = "contract0009.144";

/// Qearn state migration - backfills epoch statistics into a contract snapshot
#[derive(Parser, Debug)]
#[command(name = "qearn-migrate")]
#[command(author = "Qearn Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "One-shot migration of the Qearn contract state snapshot")]
#[command(long_about = r#"
Reads a legacy Qearn state snapshot, backfills the statistics of epochs
138 to 142 from the round info tables, and writes the snapshot back with
the statistics table appended.

Migrate in place (default file contract0009.144):
  qearn-migrate migrate

Migrate into a new file:
  qearn-migrate migrate --input contract0009.144 --output contract0009.144.new

Check what would be written without touching anything:
  qearn-migrate migrate --dry-run

Look at a snapshot:
  qearn-migrate inspect contract0009.144 --epoch 138 --format json
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate a legacy snapshot
    Migrate(MigrateCmd),

    /// Show the content of a snapshot
    Inspect(InspectCmd),
}

/// Migrate a legacy snapshot
#[derive(Parser, Debug)]
pub struct MigrateCmd {
    /// Legacy state file to read
    #[arg(short, long, default_value = DEFAULT_STATE_FILE)]
    pub input: PathBuf,

    /// File to write (defaults to the input, overwritten in place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Accept a snapshot shorter than the legacy layout; missing records stay zero
    #[arg(long)]
    pub allow_short_read: bool,

    /// Compute the statistics but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Show the content of a snapshot
#[derive(Parser, Debug)]
pub struct InspectCmd {
    /// State file to read
    #[arg(default_value = DEFAULT_STATE_FILE)]
    pub path: PathBuf,

    /// Epochs to show (can be specified multiple times, defaults to the backfilled epochs)
    #[arg(long = "epoch", value_name = "EPOCH")]
    pub epochs: Vec<u64>,

    /// Accept a snapshot shorter than its layout; missing records stay zero
    #[arg(long)]
    pub allow_short_read: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}
