// Backfill - Statistics of the epochs whose metrics were never recorded
//
// All arithmetic is u64 with native wraparound, exactly as the contract
// computes it. Division goes through `safe_div`.

use crate::state::{EpochNumber, QearnState, RoundInfo, StatsInfo};
use serde::Serialize;
use tracing::info;

/// Share of an early-unlock penalty that is burned (contract v4.7)
pub const QEARN_BURN_PERCENT: u64 = 45;

/// Share of an early-unlock penalty paid back as reward (contract v4.7)
pub const QEARN_EARLY_UNLOCKING_PERCENT: u64 = 5;

/// Fixed-point scale of the bonus-per-locked ratio (7 decimal digits)
pub const FIXED_POINT_SCALE: u64 = 10_000_000;

/// Epoch whose bonus delta is split into burn, reward and boost
pub const BURN_SPLIT_EPOCH: EpochNumber = 138;

/// Epochs backfilled by the migration, in application order
pub const BACKFILL_EPOCHS: [EpochNumber; 5] = [138, 139, 140, 141, 142];

/// `a / b`, or 0 when `b == 0`. Truncates toward zero.
#[inline]
pub fn safe_div(a: u64, b: u64) -> u64 {
    if b == 0 {
        0
    } else {
        a / b
    }
}

/// Epoch 138: the bonus pool delta was split between burn, early-unlock
/// reward and boost.
pub fn burn_split_stats(initial: &RoundInfo, current: &RoundInfo) -> StatsInfo {
    let delta = initial.epoch_bonus_amount.wrapping_sub(current.epoch_bonus_amount);
    let unit = safe_div(delta, QEARN_BURN_PERCENT + QEARN_EARLY_UNLOCKING_PERCENT);

    StatsInfo {
        burned_amount: unit.wrapping_mul(QEARN_BURN_PERCENT),
        boosted_amount: unit
            .wrapping_mul(100 - QEARN_BURN_PERCENT - QEARN_EARLY_UNLOCKING_PERCENT),
        rewarded_amount: unit.wrapping_mul(QEARN_EARLY_UNLOCKING_PERCENT),
    }
}

/// Epochs 139..=142: everything unlocked went to boost, at the bonus per
/// locked QU ratio of the epoch.
pub fn boost_only_stats(initial: &RoundInfo, current: &RoundInfo) -> StatsInfo {
    let ratio = safe_div(
        current.epoch_bonus_amount.wrapping_mul(FIXED_POINT_SCALE),
        current.total_locked_amount,
    );
    let unlocked = initial.total_locked_amount.wrapping_sub(current.total_locked_amount);

    StatsInfo {
        burned_amount: 0,
        boosted_amount: safe_div(ratio.wrapping_mul(unlocked), FIXED_POINT_SCALE),
        rewarded_amount: 0,
    }
}

/// Statistics of one backfilled epoch, computed from the round info tables
pub fn backfill_stats(state: &QearnState, epoch: EpochNumber) -> StatsInfo {
    let initial = state.initial_round_info.get(epoch);
    let current = state.current_round_info.get(epoch);

    if epoch == BURN_SPLIT_EPOCH {
        burn_split_stats(initial, current)
    } else {
        boost_only_stats(initial, current)
    }
}

/// One backfilled slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillEntry {
    pub epoch: EpochNumber,
    pub stats: StatsInfo,
}

/// What the backfill wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub entries: Vec<BackfillEntry>,
}

impl BackfillReport {
    pub fn total_burned(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.wrapping_add(e.stats.burned_amount))
    }

    pub fn total_boosted(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.wrapping_add(e.stats.boosted_amount))
    }

    pub fn total_rewarded(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.wrapping_add(e.stats.rewarded_amount))
    }
}

/// Compute and store the statistics of every backfill epoch, ascending
pub fn apply_backfill(state: &mut QearnState) -> BackfillReport {
    let mut report = BackfillReport::default();

    for epoch in BACKFILL_EPOCHS {
        let stats = backfill_stats(state, epoch);
        state.stats_info.set(epoch, stats);

        info!(
            "📊 Epoch {}: burned={} boosted={} rewarded={}",
            epoch, stats.burned_amount, stats.boosted_amount, stats.rewarded_amount
        );
        report.entries.push(BackfillEntry { epoch, stats });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn round(locked: u64, bonus: u64) -> RoundInfo {
        RoundInfo {
            total_locked_amount: locked,
            epoch_bonus_amount: bonus,
        }
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10, 0), 0);
        assert_eq!(safe_div(0, 0), 0);
        assert_eq!(safe_div(u64::MAX, 0), 0);
        assert_eq!(safe_div(10, 3), 3);
        assert_eq!(safe_div(49, 50), 0);
    }

    #[test]
    fn test_burn_split() {
        let stats = burn_split_stats(&round(12345, 1000), &round(0, 500));
        assert_eq!(stats.burned_amount, 450);
        assert_eq!(stats.rewarded_amount, 50);
        assert_eq!(stats.boosted_amount, 500);
    }

    #[test]
    fn test_burn_split_truncates_unit() {
        // delta 99 -> unit 1
        let stats = burn_split_stats(&round(0, 199), &round(0, 100));
        assert_eq!(stats, StatsInfo { burned_amount: 45, boosted_amount: 50, rewarded_amount: 5 });
    }

    #[test]
    fn test_burn_split_no_delta() {
        let stats = burn_split_stats(&round(0, 700), &round(0, 700));
        assert_eq!(stats, StatsInfo::ZERO);
    }

    #[test]
    fn test_burn_split_underflow_wraps() {
        let stats = burn_split_stats(&round(0, 5), &round(0, 10));

        // delta = 2^64 - 5 = 18_446_744_073_709_551_611, unit = delta / 50
        let unit = 368_934_881_474_191_032u64;
        assert_eq!(5u64.wrapping_sub(10), 18_446_744_073_709_551_611);
        assert_eq!(stats.burned_amount, unit * 45);
        assert_eq!(stats.rewarded_amount, unit * 5);
        assert_eq!(stats.boosted_amount, unit * 50);
        assert_eq!(stats.burned_amount, 16_602_069_666_338_596_440);
    }

    #[test]
    fn test_boost_only() {
        let stats = boost_only_stats(&round(300, 999), &round(200, 20));
        assert_eq!(stats.burned_amount, 0);
        assert_eq!(stats.rewarded_amount, 0);
        assert_eq!(stats.boosted_amount, 10);
    }

    #[test]
    fn test_boost_only_zero_locked() {
        let stats = boost_only_stats(&round(300, 0), &round(0, 20));
        assert_eq!(stats, StatsInfo::ZERO);
    }

    #[test]
    fn test_boost_only_fixed_point_truncation() {
        // ratio = 1 * 1e7 / 3 = 3_333_333; boosted = 3_333_333 * 2 / 1e7 = 0
        let stats = boost_only_stats(&round(5, 0), &round(3, 1));
        assert_eq!(stats.boosted_amount, 0);

        // ratio = 3_333_333; boosted = 3_333_333 * 6 / 1e7 = 1
        let stats = boost_only_stats(&round(9, 0), &round(3, 1));
        assert_eq!(stats.boosted_amount, 1);
    }

    #[test]
    fn test_boost_only_locked_underflow_wraps() {
        // current locked above initial: unlocked = 2^64 - 100
        let stats = boost_only_stats(&round(100, 0), &round(200, 20));
        let ratio = 1_000_000u64;
        let expected = ratio.wrapping_mul(100u64.wrapping_sub(200)) / FIXED_POINT_SCALE;
        assert_eq!(stats.boosted_amount, expected);
    }

    #[test]
    fn test_boost_only_bonus_overflow_wraps() {
        let bonus = u64::MAX / 1_000;
        let stats = boost_only_stats(&round(2_000, 0), &round(1_000, bonus));

        let ratio = bonus.wrapping_mul(FIXED_POINT_SCALE) / 1_000;
        let expected = ratio.wrapping_mul(1_000) / FIXED_POINT_SCALE;
        assert_eq!(stats.boosted_amount, expected);
    }

    #[test]
    fn test_report_totals() {
        let report = BackfillReport {
            entries: vec![
                BackfillEntry {
                    epoch: 138,
                    stats: StatsInfo { burned_amount: 450, boosted_amount: 500, rewarded_amount: 50 },
                },
                BackfillEntry {
                    epoch: 139,
                    stats: StatsInfo { burned_amount: 0, boosted_amount: 10, rewarded_amount: 0 },
                },
            ],
        };
        assert_eq!(report.total_burned(), 450);
        assert_eq!(report.total_boosted(), 510);
        assert_eq!(report.total_rewarded(), 50);
    }

    proptest! {
        #[test]
        fn prop_safe_div_by_zero(a: u64) {
            prop_assert_eq!(safe_div(a, 0), 0);
        }

        #[test]
        fn prop_safe_div_truncates(a: u64, b in 1u64..) {
            prop_assert_eq!(safe_div(a, b), a / b);
        }

        #[test]
        fn prop_burn_split_shares_sum_to_unit_times_100(initial: u64, current: u64) {
            let stats = burn_split_stats(&round(0, initial), &round(0, current));
            let unit = initial.wrapping_sub(current) / 50;
            prop_assert_eq!(stats.burned_amount, unit.wrapping_mul(45));
            prop_assert_eq!(stats.rewarded_amount, unit.wrapping_mul(5));
            prop_assert_eq!(stats.boosted_amount, unit.wrapping_mul(50));
        }
    }
}
