// Runner - Execute the CLI commands
// Principle: All output for humans goes through here, the engine only logs

use crate::cli::config::{InspectConfig, MigrationConfig, OutputFormat};
use crate::codec::{read_state_file, CodecError, StateLayout};
use crate::migration::{backfill_stats, run_migration, MigrationError, BACKFILL_EPOCHS};
use crate::state::{EpochIndexInfo, EpochNumber, HistoryInfo, QearnState, RoundInfo, StatsInfo};
use serde::Serialize;
use tracing::info;

/// Run the migration and confirm where the state went
pub fn run_migrate(config: MigrationConfig) -> Result<(), RunnerError> {
    let outcome = run_migration(&config)?;

    info!(
        "✅ Backfilled {} epochs: burned={} boosted={} rewarded={}",
        outcome.report.entries.len(),
        outcome.report.total_burned(),
        outcome.report.total_boosted(),
        outcome.report.total_rewarded()
    );

    match outcome.bytes_written {
        Some(_) => println!(
            "Migration completed successfully. New state saved to: {}",
            outcome.output.display()
        ),
        None => {
            println!("Dry run, nothing written. Computed statistics:");
            for entry in &outcome.report.entries {
                println!(
                    "  epoch {}: burned={} boosted={} rewarded={}",
                    entry.epoch,
                    entry.stats.burned_amount,
                    entry.stats.boosted_amount,
                    entry.stats.rewarded_amount
                );
            }
        }
    }

    Ok(())
}

/// Per-epoch view of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpochSummary {
    pub epoch: EpochNumber,
    pub initial: RoundInfo,
    pub current: RoundInfo,
    pub index: EpochIndexInfo,
    /// Locks in the epoch's index range held by a non-zero id
    pub active_locks: usize,
    /// Sum of the amounts of those locks
    pub locked_in_table: u64,
    /// Statistics stored in the snapshot (migrated layout only)
    pub stats: Option<StatsInfo>,
    /// What the migration computes for this epoch (backfilled epochs only)
    pub backfill: Option<StatsInfo>,
}

/// Overview of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub layout: StateLayout,
    pub early_unlocked_cnt: u32,
    pub fully_unlocked_cnt: u32,
    /// Sum of the unlocked amounts over the early unlock events in use
    pub early_unlocked_amount: u64,
    /// Sum of the unlocked amounts over the full unlock events in use
    pub fully_unlocked_amount: u64,
    pub epochs: Vec<EpochSummary>,
}

impl StateSummary {
    pub fn build(state: &QearnState, layout: StateLayout, epochs: &[EpochNumber]) -> Self {
        let epochs = epochs
            .iter()
            .map(|&epoch| {
                let (active_locks, locked_in_table) = state
                    .locks_of_epoch(epoch)
                    .filter(|lock| !lock.id.is_zero())
                    .fold((0usize, 0u64), |(count, sum), lock| {
                        (count + 1, sum.wrapping_add(lock.locked_amount))
                    });

                EpochSummary {
                    epoch,
                    initial: *state.initial_round_info.get(epoch),
                    current: *state.current_round_info.get(epoch),
                    index: *state.epoch_index.get(epoch),
                    active_locks,
                    locked_in_table,
                    stats: (layout == StateLayout::Migrated)
                        .then(|| *state.stats_info.get(epoch)),
                    backfill: BACKFILL_EPOCHS
                        .contains(&epoch)
                        .then(|| backfill_stats(state, epoch)),
                }
            })
            .collect();

        Self {
            layout,
            early_unlocked_cnt: state.early_unlocked_cnt,
            fully_unlocked_cnt: state.fully_unlocked_cnt,
            early_unlocked_amount: unlocked_total(state.early_unlock_history()),
            fully_unlocked_amount: unlocked_total(state.full_unlock_history()),
            epochs,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Layout: {}\n", self.layout));
        out.push_str(&format!(
            "Early unlocks: {} ({} QU)\n",
            self.early_unlocked_cnt, self.early_unlocked_amount
        ));
        out.push_str(&format!(
            "Full unlocks: {} ({} QU)\n",
            self.fully_unlocked_cnt, self.fully_unlocked_amount
        ));

        for e in &self.epochs {
            out.push_str(&format!("\nEpoch {}\n", e.epoch));
            out.push_str(&format!(
                "  locked: initial={} current={}\n",
                e.initial.total_locked_amount, e.current.total_locked_amount
            ));
            out.push_str(&format!(
                "  bonus:  initial={} current={}\n",
                e.initial.epoch_bonus_amount, e.current.epoch_bonus_amount
            ));
            out.push_str(&format!(
                "  locks:  [{}, {}) ({} entries)\n",
                e.index.start_index,
                e.index.end_index,
                e.index.len()
            ));
            out.push_str(&format!(
                "  active: {} locks, {} QU\n",
                e.active_locks, e.locked_in_table
            ));
            if let Some(stats) = e.stats {
                out.push_str(&format!(
                    "  stored:   burned={} boosted={} rewarded={}\n",
                    stats.burned_amount, stats.boosted_amount, stats.rewarded_amount
                ));
            }
            if let Some(stats) = e.backfill {
                out.push_str(&format!(
                    "  backfill: burned={} boosted={} rewarded={}\n",
                    stats.burned_amount, stats.boosted_amount, stats.rewarded_amount
                ));
            }
        }
        out
    }
}

fn unlocked_total(history: &[HistoryInfo]) -> u64 {
    history
        .iter()
        .fold(0u64, |acc, h| acc.wrapping_add(h.unlocked_amount))
}

/// Print an overview of a snapshot
pub fn run_inspect(config: InspectConfig) -> Result<(), RunnerError> {
    let (state, layout) = read_state_file(&config.path, config.read_policy)?;
    let summary = StateSummary::build(&state, layout, &config.epochs);

    match config.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| RunnerError::Output(e.to_string()))?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("State error: {0}")]
    State(#[from] CodecError),

    #[error("Output error: {0}")]
    Output(String),
}
