// Records - Plain data records of the Qearn contract state
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of epochs tracked (round info, epoch index, stats)
pub const QEARN_MAX_EPOCHS: usize = 4096;

/// Maximum number of simultaneous locks
pub const QEARN_MAX_LOCKS: usize = 4_194_304;

/// Capacity of each unlock history table
pub const QEARN_MAX_USERS: usize = 131_072;

/// Epoch number as stored by the contract (indexes the per-epoch tables)
pub type EpochNumber = u64;

/// Amount of QU
pub type Amount = u64;

/// 256-bit identifier (public key of a locker)
///
/// Opaque: the migration copies it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Id([u8; 32]);

impl Id {
    pub const ZERO: Id = Id([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Id(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Locked amount and bonus pool of one epoch
///
/// The state keeps two tables of these: the values at epoch start and the
/// values after the unlocks that happened since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundInfo {
    pub total_locked_amount: Amount,
    pub epoch_bonus_amount: Amount,
}

/// Range of the global lock table owned by one epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpochIndexInfo {
    pub start_index: u32,
    pub end_index: u32,
}

impl EpochIndexInfo {
    pub fn len(&self) -> u32 {
        self.end_index.wrapping_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// One active lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockInfo {
    pub locked_amount: Amount,
    pub id: Id,
    pub locked_epoch: u32,
}

/// One early or full unlock event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryInfo {
    pub unlocked_amount: Amount,
    pub rewarded_amount: Amount,
    pub unlocked_id: Id,
}

/// Burn / boost / reward statistics of one epoch
///
/// Not present in the legacy state; introduced by this migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsInfo {
    pub burned_amount: Amount,
    pub boosted_amount: Amount,
    pub rewarded_amount: Amount,
}

impl StatsInfo {
    pub const ZERO: StatsInfo = StatsInfo {
        burned_amount: 0,
        boosted_amount: 0,
        rewarded_amount: 0,
    };
}
