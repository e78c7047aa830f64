// Stream - Section-wise decode/encode over any reader or writer
use super::wire::{wire_options, WireRecord};
use super::{CodecError, ReadPolicy, Section};
use crate::state::{FixedArray, QearnState};
use bincode::Options;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

/// Reads the sections of a blob in order, tracking how many bytes are left.
///
/// `available` is the total size of the blob; it decides up front how many
/// whole records each section still has, so a short blob never surfaces as
/// an EOF in the middle of a record.
pub struct SectionReader<R> {
    reader: R,
    total: u64,
    remaining: u64,
    policy: ReadPolicy,
}

impl<R: Read> SectionReader<R> {
    pub fn new(reader: R, available: u64, policy: ReadPolicy) -> Self {
        Self {
            reader,
            total: available,
            remaining: available,
            policy,
        }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn short_section(&self, section: Section, expected: u64) -> Result<(), CodecError> {
        match self.policy {
            ReadPolicy::Strict => Err(CodecError::Truncated {
                section,
                expected,
                available: self.remaining,
                total: self.total,
            }),
            ReadPolicy::Lenient => {
                warn!(
                    "State truncated in section {}: {} of {} bytes present, missing records stay zero",
                    section,
                    self.remaining,
                    expected
                );
                Ok(())
            }
        }
    }

    /// Skip the bytes of a partial record at the end of a short blob.
    /// The partial record itself stays zeroed, its bytes are not kept.
    fn discard_rest(&mut self, section: Section) -> Result<(), CodecError> {
        if self.remaining == 0 {
            return Ok(());
        }
        io::copy(&mut (&mut self.reader).take(self.remaining), &mut io::sink()).map_err(
            |e| CodecError::Read {
                section,
                source: Box::new(bincode::ErrorKind::Io(e)),
            },
        )?;
        self.remaining = 0;
        Ok(())
    }

    /// Fill `table` from the next section. Returns the number of records read.
    pub fn read_table<T: WireRecord, const N: usize>(
        &mut self,
        section: Section,
        table: &mut FixedArray<T, N>,
    ) -> Result<u64, CodecError> {
        let record_len = T::WIRE_SIZE as u64;
        let wanted = N as u64 * record_len;

        let records = if self.remaining >= wanted {
            N as u64
        } else {
            self.short_section(section, wanted)?;
            self.remaining / record_len
        };

        for slot in table.as_mut_slice().iter_mut().take(records as usize) {
            let wire: T::Wire = wire_options()
                .deserialize_from(&mut self.reader)
                .map_err(|source| CodecError::Read { section, source })?;
            *slot = T::from_wire(wire);
        }
        self.remaining -= records * record_len;

        if records < N as u64 {
            self.discard_rest(section)?;
        }

        debug!("Read {} records of {}", records, section);
        Ok(records)
    }

    /// Read a `u32` counter; `None` if a lenient read ran out of bytes
    pub fn read_counter(&mut self, section: Section) -> Result<Option<u32>, CodecError> {
        if self.remaining < section.byte_len() {
            self.short_section(section, section.byte_len())?;
            self.discard_rest(section)?;
            return Ok(None);
        }

        let value: u32 = wire_options()
            .deserialize_from(&mut self.reader)
            .map_err(|source| CodecError::Read { section, source })?;
        self.remaining -= section.byte_len();
        Ok(Some(value))
    }
}

/// Write every slot of `table`. Returns the number of bytes written.
pub fn write_table<W: Write, T: WireRecord, const N: usize>(
    writer: &mut W,
    section: Section,
    table: &FixedArray<T, N>,
) -> Result<u64, CodecError> {
    for record in table.iter() {
        wire_options()
            .serialize_into(&mut *writer, &record.to_wire())
            .map_err(|source| CodecError::Write { section, source })?;
    }
    Ok(N as u64 * T::WIRE_SIZE as u64)
}

fn write_counter<W: Write>(writer: &mut W, section: Section, value: u32) -> Result<u64, CodecError> {
    wire_options()
        .serialize_into(&mut *writer, &value)
        .map_err(|source| CodecError::Write { section, source })?;
    Ok(section.byte_len())
}

/// Fail with `Truncated` if a blob of `available` bytes cannot hold `sections`
fn ensure_complete(available: u64, sections: &[Section]) -> Result<(), CodecError> {
    let mut offset = 0u64;
    for &section in sections {
        let end = offset + section.byte_len();
        if available < end {
            return Err(CodecError::Truncated {
                section,
                expected: section.byte_len(),
                available: available.saturating_sub(offset),
                total: available,
            });
        }
        offset = end;
    }
    Ok(())
}

/// Decode one section into its table or counter
fn read_section<R: Read>(
    sections: &mut SectionReader<R>,
    state: &mut QearnState,
    section: Section,
) -> Result<(), CodecError> {
    match section {
        Section::InitialRoundInfo => {
            sections.read_table(section, &mut state.initial_round_info)?;
        }
        Section::CurrentRoundInfo => {
            sections.read_table(section, &mut state.current_round_info)?;
        }
        Section::EpochIndex => {
            sections.read_table(section, &mut state.epoch_index)?;
        }
        Section::Locker => {
            sections.read_table(section, &mut state.locker)?;
        }
        Section::EarlyUnlocker => {
            sections.read_table(section, &mut state.early_unlocker)?;
        }
        Section::FullyUnlocker => {
            sections.read_table(section, &mut state.fully_unlocker)?;
        }
        Section::EarlyUnlockedCnt => {
            if let Some(count) = sections.read_counter(section)? {
                state.early_unlocked_cnt = count;
            }
        }
        Section::FullyUnlockedCnt => {
            if let Some(count) = sections.read_counter(section)? {
                state.fully_unlocked_cnt = count;
            }
        }
        Section::StatsInfo => {
            sections.read_table(section, &mut state.stats_info)?;
        }
    }
    Ok(())
}

/// Encode one section. Returns the number of bytes written.
fn write_section<W: Write>(
    writer: &mut W,
    state: &QearnState,
    section: Section,
) -> Result<u64, CodecError> {
    match section {
        Section::InitialRoundInfo => write_table(writer, section, &state.initial_round_info),
        Section::CurrentRoundInfo => write_table(writer, section, &state.current_round_info),
        Section::EpochIndex => write_table(writer, section, &state.epoch_index),
        Section::Locker => write_table(writer, section, &state.locker),
        Section::EarlyUnlocker => write_table(writer, section, &state.early_unlocker),
        Section::FullyUnlocker => write_table(writer, section, &state.fully_unlocker),
        Section::EarlyUnlockedCnt => write_counter(writer, section, state.early_unlocked_cnt),
        Section::FullyUnlockedCnt => write_counter(writer, section, state.fully_unlocked_cnt),
        Section::StatsInfo => write_table(writer, section, &state.stats_info),
    }
}

fn decode_sections<R: Read>(
    reader: R,
    available: u64,
    policy: ReadPolicy,
    layout: &[Section],
) -> Result<QearnState, CodecError> {
    if policy == ReadPolicy::Strict {
        ensure_complete(available, layout)?;
    }

    let mut state = QearnState::new();
    let mut sections = SectionReader::new(reader, available, policy);
    for &section in layout {
        read_section(&mut sections, &mut state, section)?;
    }
    Ok(state)
}

fn encode_sections<W: Write>(
    state: &QearnState,
    writer: &mut W,
    layout: &[Section],
) -> Result<u64, CodecError> {
    let mut written = 0;
    for &section in layout {
        written += write_section(writer, state, section)?;
    }
    Ok(written)
}

/// Decode a legacy blob. Statistics stay zero; bytes past the legacy
/// layout are not read.
pub fn decode_legacy<R: Read>(
    reader: R,
    available: u64,
    policy: ReadPolicy,
) -> Result<QearnState, CodecError> {
    decode_sections(reader, available, policy, &Section::LEGACY)
}

/// Decode a migrated blob (legacy layout + statistics)
pub fn decode_migrated<R: Read>(
    reader: R,
    available: u64,
    policy: ReadPolicy,
) -> Result<QearnState, CodecError> {
    decode_sections(reader, available, policy, &Section::MIGRATED)
}

/// Encode the legacy prefix. Returns the number of bytes written.
pub fn encode_legacy<W: Write>(state: &QearnState, writer: &mut W) -> Result<u64, CodecError> {
    encode_sections(state, writer, &Section::LEGACY)
}

/// Encode the migrated layout: legacy prefix, then statistics
pub fn encode_migrated<W: Write>(state: &QearnState, writer: &mut W) -> Result<u64, CodecError> {
    encode_sections(state, writer, &Section::MIGRATED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::LEGACY_STATE_LEN;
    use crate::state::{HistoryInfo, Id, LockInfo, RoundInfo};

    type SmallRounds = FixedArray<RoundInfo, 4>;
    type SmallLocks = FixedArray<LockInfo, 4>;

    fn sample_rounds() -> SmallRounds {
        let mut rounds = SmallRounds::new();
        for i in 0..4u64 {
            rounds.set(
                i,
                RoundInfo {
                    total_locked_amount: 100 * (i + 1),
                    epoch_bonus_amount: 10 * (i + 1),
                },
            );
        }
        rounds
    }

    fn encode_table<T: WireRecord, const N: usize>(table: &FixedArray<T, N>) -> Vec<u8> {
        let mut bytes = Vec::new();
        let written = write_table(&mut bytes, Section::InitialRoundInfo, table).unwrap();
        assert_eq!(written as usize, bytes.len());
        bytes
    }

    #[test]
    fn test_table_round_trip() {
        let rounds = sample_rounds();
        let bytes = encode_table(&rounds);
        assert_eq!(bytes.len(), 4 * 16);

        let mut decoded = SmallRounds::new();
        let mut reader = SectionReader::new(&bytes[..], bytes.len() as u64, ReadPolicy::Strict);
        let records = reader.read_table(Section::InitialRoundInfo, &mut decoded).unwrap();

        assert_eq!(records, 4);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(decoded, rounds);
    }

    #[test]
    fn test_lock_ids_copied_verbatim() {
        let mut locks = SmallLocks::new();
        let mut raw = [0u8; 32];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = i as u8;
        }
        locks.set(2, LockInfo { locked_amount: 9, id: Id::from_bytes(raw), locked_epoch: 139 });

        let bytes = encode_table(&locks);
        assert_eq!(&bytes[2 * 96 + 32..2 * 96 + 64], &raw);

        let mut decoded = SmallLocks::new();
        SectionReader::new(&bytes[..], bytes.len() as u64, ReadPolicy::Strict)
            .read_table(Section::Locker, &mut decoded)
            .unwrap();
        assert_eq!(decoded.get(2).id.as_bytes(), &raw);
    }

    #[test]
    fn test_strict_short_table_is_error() {
        let bytes = encode_table(&sample_rounds());
        let short = &bytes[..40];

        let mut decoded = SmallRounds::new();
        let err = SectionReader::new(short, short.len() as u64, ReadPolicy::Strict)
            .read_table(Section::InitialRoundInfo, &mut decoded)
            .unwrap_err();

        match err {
            CodecError::Truncated { section, expected, available, total } => {
                assert_eq!(section, Section::InitialRoundInfo);
                assert_eq!(expected, 64);
                assert_eq!(available, 40);
                assert_eq!(total, 40);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lenient_short_table_keeps_whole_records() {
        let bytes = encode_table(&sample_rounds());
        // Two whole records and half of the third
        let short = &bytes[..40];

        let mut decoded = SmallRounds::new();
        let mut reader = SectionReader::new(short, short.len() as u64, ReadPolicy::Lenient);
        let records = reader.read_table(Section::InitialRoundInfo, &mut decoded).unwrap();

        assert_eq!(records, 2);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(decoded.get(0).total_locked_amount, 100);
        assert_eq!(decoded.get(1).total_locked_amount, 200);
        assert_eq!(*decoded.get(2), RoundInfo::default());
        assert_eq!(*decoded.get(3), RoundInfo::default());
    }

    #[test]
    fn test_counters() {
        let mut bytes = Vec::new();
        write_counter(&mut bytes, Section::EarlyUnlockedCnt, 7).unwrap();
        write_counter(&mut bytes, Section::FullyUnlockedCnt, 0x01020304).unwrap();
        assert_eq!(bytes, vec![7, 0, 0, 0, 4, 3, 2, 1]);

        let mut reader = SectionReader::new(&bytes[..], 8, ReadPolicy::Strict);
        assert_eq!(reader.read_counter(Section::EarlyUnlockedCnt).unwrap(), Some(7));
        assert_eq!(reader.read_counter(Section::FullyUnlockedCnt).unwrap(), Some(0x01020304));
    }

    #[test]
    fn test_lenient_missing_counter() {
        let bytes = [1u8, 0];
        let mut reader = SectionReader::new(&bytes[..], 2, ReadPolicy::Lenient);
        assert_eq!(reader.read_counter(Section::EarlyUnlockedCnt).unwrap(), None);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_history_table_round_trip() {
        let mut history = FixedArray::<HistoryInfo, 2>::new();
        history.set(
            1,
            HistoryInfo {
                unlocked_amount: 11,
                rewarded_amount: 3,
                unlocked_id: Id::from_bytes([0x5a; 32]),
            },
        );
        let bytes = encode_table(&history);
        assert_eq!(bytes.len(), 128);

        let mut decoded = FixedArray::<HistoryInfo, 2>::new();
        SectionReader::new(&bytes[..], 128, ReadPolicy::Strict)
            .read_table(Section::EarlyUnlocker, &mut decoded)
            .unwrap();
        assert_eq!(decoded, history);
    }

    #[test]
    fn test_ensure_complete_reports_first_short_section() {
        // Enough for both round info tables and part of the epoch index
        let available = Section::InitialRoundInfo.byte_len() * 2 + 100;
        let err = ensure_complete(available, &Section::LEGACY).unwrap_err();
        match err {
            CodecError::Truncated { section, available: left, .. } => {
                assert_eq!(section, Section::EpochIndex);
                assert_eq!(left, 100);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(ensure_complete(LEGACY_STATE_LEN, &Section::LEGACY).is_ok());
        assert!(ensure_complete(LEGACY_STATE_LEN, &Section::MIGRATED).is_err());
    }

    #[test]
    fn test_decode_legacy_strict_rejects_before_reading() {
        let bytes = vec![0u8; 1024];
        let err = decode_legacy(&bytes[..], bytes.len() as u64, ReadPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Truncated { section: Section::InitialRoundInfo, .. }
        ));
    }
}
