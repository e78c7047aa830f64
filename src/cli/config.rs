// CLI Configuration - Convert CLI args to run configuration
// Principle: Clear mapping between user input and internal configuration

use crate::cli::{InspectCmd, MigrateCmd};
use crate::codec::ReadPolicy;
use crate::migration::BACKFILL_EPOCHS;
use crate::state::{EpochNumber, QEARN_MAX_EPOCHS};
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration of a migration run
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Legacy state to read
    pub input: PathBuf,
    /// Where to write the migrated state (may equal `input`)
    pub output: PathBuf,
    /// Handling of a snapshot shorter than the legacy layout
    pub read_policy: ReadPolicy,
    /// Compute only, write nothing
    pub dry_run: bool,
}

/// Configuration of an inspection
#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub path: PathBuf,
    pub epochs: Vec<EpochNumber>,
    pub read_policy: ReadPolicy,
    pub format: OutputFormat,
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn read_policy(allow_short_read: bool) -> ReadPolicy {
    if allow_short_read {
        ReadPolicy::Lenient
    } else {
        ReadPolicy::Strict
    }
}

fn require_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyPath);
    }
    Ok(())
}

impl MigrationConfig {
    /// Create configuration from CLI migrate command
    pub fn from_migrate_cmd(cmd: &MigrateCmd) -> Result<Self, ConfigError> {
        require_path(&cmd.input)?;

        // Same file as the input unless told otherwise
        let output = cmd.output.clone().unwrap_or_else(|| cmd.input.clone());
        require_path(&output)?;

        if output == cmd.input {
            info!("Output is the input file, it will be replaced in place");
        }

        Ok(Self {
            input: cmd.input.clone(),
            output,
            read_policy: read_policy(cmd.allow_short_read),
            dry_run: cmd.dry_run,
        })
    }
}

impl InspectConfig {
    /// Create configuration from CLI inspect command
    pub fn from_inspect_cmd(cmd: &InspectCmd) -> Result<Self, ConfigError> {
        require_path(&cmd.path)?;

        let format = match cmd.format.as_str() {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            other => return Err(ConfigError::InvalidFormat(other.to_string())),
        };

        // Inspection looks at real slots only, no wraparound aliasing
        if let Some(&epoch) = cmd.epochs.iter().find(|e| **e >= QEARN_MAX_EPOCHS as u64) {
            return Err(ConfigError::EpochOutOfRange(epoch));
        }

        let epochs = if cmd.epochs.is_empty() {
            BACKFILL_EPOCHS.to_vec()
        } else {
            cmd.epochs.clone()
        };

        Ok(Self {
            path: cmd.path.clone(),
            epochs,
            read_policy: read_policy(cmd.allow_short_read),
            format,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Empty file path")]
    EmptyPath,

    #[error("Invalid output format: {0} (expected text or json)")]
    InvalidFormat(String),

    #[error("Epoch {0} out of range (max {max})", max = QEARN_MAX_EPOCHS - 1)]
    EpochOutOfRange(u64),
}
