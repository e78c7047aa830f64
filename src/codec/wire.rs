// Wire - On-disk record layouts
//
// Each record is written with the native layout of the contract host
// (x86-64, little-endian), alignment padding included. `Id` is 32-byte
// aligned there, which is where the padding in LockInfo and HistoryInfo
// comes from. Field order is the declaration order of the wire structs.

use crate::state::{EpochIndexInfo, HistoryInfo, Id, LockInfo, RoundInfo, StatsInfo};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// bincode configuration for the wire layout: fixed-width integers,
/// little-endian, no length prefixes (all fields are fixed size)
pub fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

/// A record stored in a fixed-size table of the state blob
pub trait WireRecord: Copy + Default {
    /// Bytes occupied by one record on disk, padding included
    const WIRE_SIZE: usize;

    type Wire: Serialize + DeserializeOwned;

    fn to_wire(&self) -> Self::Wire;
    fn from_wire(wire: Self::Wire) -> Self;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoundInfoWire {
    total_locked_amount: u64,
    epoch_bonus_amount: u64,
}

impl WireRecord for RoundInfo {
    const WIRE_SIZE: usize = 16;
    type Wire = RoundInfoWire;

    fn to_wire(&self) -> RoundInfoWire {
        RoundInfoWire {
            total_locked_amount: self.total_locked_amount,
            epoch_bonus_amount: self.epoch_bonus_amount,
        }
    }

    fn from_wire(wire: RoundInfoWire) -> Self {
        Self {
            total_locked_amount: wire.total_locked_amount,
            epoch_bonus_amount: wire.epoch_bonus_amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EpochIndexInfoWire {
    start_index: u32,
    end_index: u32,
}

impl WireRecord for EpochIndexInfo {
    const WIRE_SIZE: usize = 8;
    type Wire = EpochIndexInfoWire;

    fn to_wire(&self) -> EpochIndexInfoWire {
        EpochIndexInfoWire {
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }

    fn from_wire(wire: EpochIndexInfoWire) -> Self {
        Self {
            start_index: wire.start_index,
            end_index: wire.end_index,
        }
    }
}

/// `u64 | pad 24 | id 32 | u32 | pad 28` = 96 bytes
///
/// Padding is skipped on read and written as zero, so non-zero padding in
/// the input does not survive a migration.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockInfoWire {
    locked_amount: u64,
    align_pad: [u8; 24],
    id: [u8; 32],
    locked_epoch: u32,
    tail_pad: [u8; 28],
}

impl WireRecord for LockInfo {
    const WIRE_SIZE: usize = 96;
    type Wire = LockInfoWire;

    fn to_wire(&self) -> LockInfoWire {
        LockInfoWire {
            locked_amount: self.locked_amount,
            align_pad: [0u8; 24],
            id: *self.id.as_bytes(),
            locked_epoch: self.locked_epoch,
            tail_pad: [0u8; 28],
        }
    }

    fn from_wire(wire: LockInfoWire) -> Self {
        Self {
            locked_amount: wire.locked_amount,
            id: Id::from_bytes(wire.id),
            locked_epoch: wire.locked_epoch,
        }
    }
}

/// `u64 | u64 | pad 16 | id 32` = 64 bytes, padding handled as in `LockInfoWire`
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryInfoWire {
    unlocked_amount: u64,
    rewarded_amount: u64,
    align_pad: [u8; 16],
    unlocked_id: [u8; 32],
}

impl WireRecord for HistoryInfo {
    const WIRE_SIZE: usize = 64;
    type Wire = HistoryInfoWire;

    fn to_wire(&self) -> HistoryInfoWire {
        HistoryInfoWire {
            unlocked_amount: self.unlocked_amount,
            rewarded_amount: self.rewarded_amount,
            align_pad: [0u8; 16],
            unlocked_id: *self.unlocked_id.as_bytes(),
        }
    }

    fn from_wire(wire: HistoryInfoWire) -> Self {
        Self {
            unlocked_amount: wire.unlocked_amount,
            rewarded_amount: wire.rewarded_amount,
            unlocked_id: Id::from_bytes(wire.unlocked_id),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsInfoWire {
    burned_amount: u64,
    boosted_amount: u64,
    rewarded_amount: u64,
}

impl WireRecord for StatsInfo {
    const WIRE_SIZE: usize = 24;
    type Wire = StatsInfoWire;

    fn to_wire(&self) -> StatsInfoWire {
        StatsInfoWire {
            burned_amount: self.burned_amount,
            boosted_amount: self.boosted_amount,
            rewarded_amount: self.rewarded_amount,
        }
    }

    fn from_wire(wire: StatsInfoWire) -> Self {
        Self {
            burned_amount: wire.burned_amount,
            boosted_amount: wire.boosted_amount,
            rewarded_amount: wire.rewarded_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: WireRecord>(record: &T) -> Vec<u8> {
        wire_options().serialize(&record.to_wire()).unwrap()
    }

    fn decode<T: WireRecord>(bytes: &[u8]) -> T {
        T::from_wire(wire_options().deserialize(bytes).unwrap())
    }

    #[test]
    fn test_wire_sizes_match_native_layout() {
        assert_eq!(encode(&RoundInfo::default()).len(), RoundInfo::WIRE_SIZE);
        assert_eq!(encode(&EpochIndexInfo::default()).len(), EpochIndexInfo::WIRE_SIZE);
        assert_eq!(encode(&LockInfo::default()).len(), LockInfo::WIRE_SIZE);
        assert_eq!(encode(&HistoryInfo::default()).len(), HistoryInfo::WIRE_SIZE);
        assert_eq!(encode(&StatsInfo::default()).len(), StatsInfo::WIRE_SIZE);
    }

    #[test]
    fn test_round_info_field_order() {
        let bytes = encode(&RoundInfo {
            total_locked_amount: 0x0102,
            epoch_bonus_amount: 7,
        });
        assert_eq!(&bytes[0..8], &0x0102u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &7u64.to_le_bytes());
    }

    #[test]
    fn test_lock_info_offsets() {
        let lock = LockInfo {
            locked_amount: 1_000_000,
            id: Id::from_bytes([0xcd; 32]),
            locked_epoch: 138,
        };
        let bytes = encode(&lock);

        assert_eq!(&bytes[0..8], &1_000_000u64.to_le_bytes());
        assert!(bytes[8..32].iter().all(|b| *b == 0));
        assert_eq!(&bytes[32..64], &[0xcdu8; 32]);
        assert_eq!(&bytes[64..68], &138u32.to_le_bytes());
        assert!(bytes[68..96].iter().all(|b| *b == 0));

        assert_eq!(decode::<LockInfo>(&bytes), lock);
    }

    #[test]
    fn test_history_info_offsets() {
        let history = HistoryInfo {
            unlocked_amount: 5,
            rewarded_amount: 6,
            unlocked_id: Id::from_bytes([0x11; 32]),
        };
        let bytes = encode(&history);

        assert_eq!(&bytes[0..8], &5u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &6u64.to_le_bytes());
        assert!(bytes[16..32].iter().all(|b| *b == 0));
        assert_eq!(&bytes[32..64], &[0x11u8; 32]);
    }

    #[test]
    fn test_padding_ignored_on_read() {
        let lock = LockInfo {
            locked_amount: 42,
            id: Id::from_bytes([9; 32]),
            locked_epoch: 140,
        };
        let mut bytes = encode(&lock);
        bytes[8..32].fill(0xff);
        bytes[68..96].fill(0xee);

        assert_eq!(decode::<LockInfo>(&bytes), lock);
    }

    #[test]
    fn test_stats_info_field_order() {
        let bytes = encode(&StatsInfo {
            burned_amount: 1,
            boosted_amount: 2,
            rewarded_amount: 3,
        });
        assert_eq!(&bytes[0..8], &1u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &2u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &3u64.to_le_bytes());
    }
}
