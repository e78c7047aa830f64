// Driver - decode -> reset stats -> backfill -> encode
use super::backfill::{apply_backfill, BackfillReport};
use crate::cli::config::MigrationConfig;
use crate::codec::{read_state_file, write_state_file, CodecError, StateLayout};
use crate::state::QearnState;
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of a completed migration
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// Where the state was written (the planned target on a dry run)
    pub output: PathBuf,
    /// Layout the input was recognised as
    pub source_layout: StateLayout,
    pub report: BackfillReport,
    /// `None` on a dry run
    pub bytes_written: Option<u64>,
}

/// Migration errors
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Failed to load state: {0}")]
    Load(#[source] CodecError),

    #[error("Failed to store state: {0}")]
    Store(#[source] CodecError),
}

/// In-memory part of the migration: zero every statistics slot, then
/// backfill the historical epochs.
pub fn migrate_state(state: &mut QearnState) -> BackfillReport {
    state.reset_stats();
    apply_backfill(state)
}

/// Run the whole migration. Stops at the first failure; the output file is
/// only touched once the new state is completely computed.
pub fn run_migration(config: &MigrationConfig) -> Result<MigrationOutcome, MigrationError> {
    info!(
        "🚚 Migrating Qearn state {} -> {}",
        config.input.display(),
        config.output.display()
    );

    let (mut state, source_layout) =
        read_state_file(&config.input, config.read_policy).map_err(MigrationError::Load)?;

    if source_layout == StateLayout::Migrated {
        warn!("⚠️  Input already carries epoch statistics, they will be recomputed");
    }

    let report = migrate_state(&mut state);

    if config.dry_run {
        info!("Dry run: {} left untouched", config.output.display());
        return Ok(MigrationOutcome {
            output: config.output.clone(),
            source_layout,
            report,
            bytes_written: None,
        });
    }

    let written = write_state_file(&config.output, &state).map_err(MigrationError::Store)?;

    Ok(MigrationOutcome {
        output: config.output.clone(),
        source_layout,
        report,
        bytes_written: Some(written),
    })
}
