// Store - Complete in-memory Qearn contract state
use super::fixed_array::FixedArray;
use super::records::*;

pub type RoundInfoTable = FixedArray<RoundInfo, QEARN_MAX_EPOCHS>;
pub type EpochIndexTable = FixedArray<EpochIndexInfo, QEARN_MAX_EPOCHS>;
pub type LockTable = FixedArray<LockInfo, QEARN_MAX_LOCKS>;
pub type HistoryTable = FixedArray<HistoryInfo, QEARN_MAX_USERS>;
pub type StatsTable = FixedArray<StatsInfo, QEARN_MAX_EPOCHS>;

/// Every table and counter persisted by the contract
///
/// Constructed once per run and handed by exclusive reference through
/// decode, backfill and encode. Tables always hold their full capacity;
/// only the two unlock counters say how much of the history tables is in use.
#[derive(Debug, PartialEq, Eq)]
pub struct QearnState {
    /// Round info as it was when each epoch started
    pub initial_round_info: RoundInfoTable,
    /// Round info after the unlocks that happened since
    pub current_round_info: RoundInfoTable,
    pub epoch_index: EpochIndexTable,
    pub locker: LockTable,
    pub early_unlocker: HistoryTable,
    pub fully_unlocker: HistoryTable,
    /// Logical (unwrapped) number of early unlock events written
    pub early_unlocked_cnt: u32,
    /// Logical (unwrapped) number of full unlock events written
    pub fully_unlocked_cnt: u32,
    /// Absent from the legacy layout
    pub stats_info: StatsTable,
}

impl QearnState {
    /// Zero-initialized state
    pub fn new() -> Self {
        Self {
            initial_round_info: FixedArray::new(),
            current_round_info: FixedArray::new(),
            epoch_index: FixedArray::new(),
            locker: FixedArray::new(),
            early_unlocker: FixedArray::new(),
            fully_unlocker: FixedArray::new(),
            early_unlocked_cnt: 0,
            fully_unlocked_cnt: 0,
            stats_info: FixedArray::new(),
        }
    }

    /// Zero every statistics slot
    pub fn reset_stats(&mut self) {
        self.stats_info.set_all(StatsInfo::ZERO);
    }

    /// Locks registered for `epoch` according to the epoch index
    pub fn locks_of_epoch(&self, epoch: EpochNumber) -> impl Iterator<Item = &LockInfo> + '_ {
        let index = *self.epoch_index.get(epoch);
        (index.start_index as u64..index.end_index as u64).map(move |i| self.locker.get(i))
    }

    /// Early unlock events in use (counter clamped to the table capacity)
    pub fn early_unlock_history(&self) -> &[HistoryInfo] {
        let used = (self.early_unlocked_cnt as usize).min(QEARN_MAX_USERS);
        &self.early_unlocker.as_slice()[..used]
    }

    /// Full unlock events in use (counter clamped to the table capacity)
    pub fn full_unlock_history(&self) -> &[HistoryInfo] {
        let used = (self.fully_unlocked_cnt as usize).min(QEARN_MAX_USERS);
        &self.fully_unlocker.as_slice()[..used]
    }
}

impl Default for QearnState {
    fn default() -> Self {
        Self::new()
    }
}
