// Qearn state migration - Entry point
// Principle: Run once, fail loudly, never leave a half-written state

#![allow(dead_code)]

mod cli;
mod codec;
mod migration;
mod state;

#[cfg(test)]
mod tests;

use clap::Parser;
use cli::config::{InspectConfig, MigrationConfig};
use cli::runner::{run_inspect, run_migrate};
use cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_filter = if cli.verbose {
        "debug"
    } else {
        &cli.log_level
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Migrate(cmd) => {
            let config = MigrationConfig::from_migrate_cmd(&cmd).map_err(|e| {
                error!("Configuration error: {}", e);
                anyhow::anyhow!("Configuration error: {}", e)
            })?;

            if let Err(e) = run_migrate(config) {
                error!("Migration failed: {}", e);
                return Err(anyhow::anyhow!("{}", e));
            }
        }

        Commands::Inspect(cmd) => {
            let config = InspectConfig::from_inspect_cmd(&cmd).map_err(|e| {
                error!("Configuration error: {}", e);
                anyhow::anyhow!("Configuration error: {}", e)
            })?;

            run_inspect(config).map_err(|e| anyhow::anyhow!("{}", e))?;
        }
    }

    Ok(())
}
