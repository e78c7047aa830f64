// Codec - Binary state blob <-> QearnState
// Principle: Exact field order, exact byte counts, no framing
//
// The blob is a flat concatenation of the tables, in a fixed order, with
// no length prefix and no version tag. The migrated layout is the legacy
// layout with the statistics table appended.

pub mod file;
pub mod stream;
pub mod wire;

pub use file::*;
pub use stream::*;
pub use wire::WireRecord;

use crate::state::{
    EpochIndexInfo, HistoryInfo, LockInfo, RoundInfo, StatsInfo, QEARN_MAX_EPOCHS,
    QEARN_MAX_LOCKS, QEARN_MAX_USERS,
};
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// One contiguous region of the state blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    InitialRoundInfo,
    CurrentRoundInfo,
    EpochIndex,
    Locker,
    EarlyUnlocker,
    FullyUnlocker,
    EarlyUnlockedCnt,
    FullyUnlockedCnt,
    StatsInfo,
}

impl Section {
    /// Sections of the legacy blob, in file order
    pub const LEGACY: [Section; 8] = [
        Section::InitialRoundInfo,
        Section::CurrentRoundInfo,
        Section::EpochIndex,
        Section::Locker,
        Section::EarlyUnlocker,
        Section::FullyUnlocker,
        Section::EarlyUnlockedCnt,
        Section::FullyUnlockedCnt,
    ];

    /// Sections of the migrated blob, in file order
    pub const MIGRATED: [Section; 9] = [
        Section::InitialRoundInfo,
        Section::CurrentRoundInfo,
        Section::EpochIndex,
        Section::Locker,
        Section::EarlyUnlocker,
        Section::FullyUnlocker,
        Section::EarlyUnlockedCnt,
        Section::FullyUnlockedCnt,
        Section::StatsInfo,
    ];

    /// Size of the section in bytes
    pub const fn byte_len(self) -> u64 {
        match self {
            Section::InitialRoundInfo | Section::CurrentRoundInfo => {
                (QEARN_MAX_EPOCHS * <RoundInfo as WireRecord>::WIRE_SIZE) as u64
            }
            Section::EpochIndex => {
                (QEARN_MAX_EPOCHS * <EpochIndexInfo as WireRecord>::WIRE_SIZE) as u64
            }
            Section::Locker => (QEARN_MAX_LOCKS * <LockInfo as WireRecord>::WIRE_SIZE) as u64,
            Section::EarlyUnlocker | Section::FullyUnlocker => {
                (QEARN_MAX_USERS * <HistoryInfo as WireRecord>::WIRE_SIZE) as u64
            }
            Section::EarlyUnlockedCnt | Section::FullyUnlockedCnt => 4,
            Section::StatsInfo => {
                (QEARN_MAX_EPOCHS * <StatsInfo as WireRecord>::WIRE_SIZE) as u64
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::InitialRoundInfo => "initial_round_info",
            Section::CurrentRoundInfo => "current_round_info",
            Section::EpochIndex => "epoch_index",
            Section::Locker => "locker",
            Section::EarlyUnlocker => "early_unlocker",
            Section::FullyUnlocker => "fully_unlocker",
            Section::EarlyUnlockedCnt => "early_unlocked_cnt",
            Section::FullyUnlockedCnt => "fully_unlocked_cnt",
            Section::StatsInfo => "stats_info",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn total_len(sections: &[Section]) -> u64 {
    let mut total = 0;
    let mut i = 0;
    while i < sections.len() {
        total += sections[i].byte_len();
        i += 1;
    }
    total
}

/// Size of a legacy state blob (no statistics)
pub const LEGACY_STATE_LEN: u64 = total_len(&Section::LEGACY);

/// Size of a migrated state blob (legacy + statistics)
pub const MIGRATED_STATE_LEN: u64 = total_len(&Section::MIGRATED);

/// Layout of a blob, recognised by its exact size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateLayout {
    Legacy,
    Migrated,
    Unknown,
}

impl StateLayout {
    pub fn detect(len: u64) -> Self {
        match len {
            LEGACY_STATE_LEN => StateLayout::Legacy,
            MIGRATED_STATE_LEN => StateLayout::Migrated,
            _ => StateLayout::Unknown,
        }
    }
}

impl fmt::Display for StateLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StateLayout::Legacy => write!(f, "legacy ({} bytes)", LEGACY_STATE_LEN),
            StateLayout::Migrated => write!(f, "migrated ({} bytes)", MIGRATED_STATE_LEN),
            StateLayout::Unknown => write!(f, "unknown"),
        }
    }
}

/// What to do with a blob shorter than the layout it is decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Reject it with `CodecError::Truncated`
    #[default]
    Strict,
    /// Decode the whole records present, leave the rest zeroed.
    /// This is what the contract's own loader did.
    Lenient,
}

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to open the old state file {}: {source}", path.display())]
    OpenRead { path: PathBuf, source: io::Error },

    #[error("Failed to open the new state file {}: {source}", path.display())]
    OpenWrite { path: PathBuf, source: io::Error },

    #[error("Failed to read section {section}: {source}")]
    Read {
        section: Section,
        source: bincode::Error,
    },

    #[error("Failed to write section {section}: {source}")]
    Write {
        section: Section,
        source: bincode::Error,
    },

    #[error("Failed to flush the new state file {}: {source}", path.display())]
    Flush { path: PathBuf, source: io::Error },

    #[error("Failed to replace {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },

    #[error(
        "State truncated in section {section}: {available} of {expected} bytes present \
         (blob is {total} bytes)"
    )]
    Truncated {
        section: Section,
        expected: u64,
        available: u64,
        total: u64,
    },
}
