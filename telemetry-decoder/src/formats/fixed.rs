//! Fixed-stride log formats
//!
//! Earlier logger firmwares wrote one self-contained record per reading, each
//! with its own timestamp, so every record is a group of one:
//!
//! ```text
//! 8-byte:   [id] [v2] [v1] [v0] [t0] [t1] [t2] [t3]
//! 12-byte:  [id0..id3] [t0..t3] [f0..f3]     all little-endian, value is f32
//! ```
//!
//! 12-byte logs start with a preamble of eight 0xFF bytes.

use super::{decode_int24, EpochBaseline, FrameSource};
use crate::encoder::FIXED12_PREAMBLE as PREAMBLE;
use crate::types::{ChannelId, Diagnostic, Millis, RawReading, RawValue, ReadingGroup, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Fixed8,
    Fixed12,
}

impl Layout {
    fn record_size(&self) -> usize {
        match self {
            Layout::Fixed8 => 8,
            Layout::Fixed12 => 12,
        }
    }
}

/// Fields of one record
struct Record {
    channel_id: ChannelId,
    timestamp: Millis,
    raw_value: RawValue,
}

/// Iterator over the records of a fixed-stride buffer
pub struct FixedFrames<'a> {
    data: &'a [u8],
    pos: usize,
    layout: Layout,
    epoch: EpochBaseline,
    diagnostics: Vec<Diagnostic>,
    finished: bool,
}

impl<'a> FixedFrames<'a> {
    /// Decoder for 8-byte records
    pub fn fixed8(data: &'a [u8], normalize_epoch: bool) -> Self {
        log::debug!("Decoding {} bytes as 8-byte records", data.len());
        Self::new(data, Layout::Fixed8, 0, normalize_epoch)
    }

    /// Decoder for 12-byte records, skipping the 0xFF preamble if present
    pub fn fixed12(data: &'a [u8], normalize_epoch: bool) -> Self {
        log::debug!("Decoding {} bytes as 12-byte records", data.len());
        let start = if data.starts_with(&PREAMBLE) {
            log::debug!("Skipping {}-byte preamble", PREAMBLE.len());
            PREAMBLE.len()
        } else {
            0
        };
        Self::new(data, Layout::Fixed12, start, normalize_epoch)
    }

    fn new(data: &'a [u8], layout: Layout, start: usize, normalize_epoch: bool) -> Self {
        Self {
            data,
            pos: start,
            layout,
            epoch: EpochBaseline::new(normalize_epoch),
            diagnostics: Vec::new(),
            finished: false,
        }
    }

    fn parse_record(&self, bytes: &[u8]) -> Record {
        match self.layout {
            Layout::Fixed8 => Record {
                channel_id: ChannelId::from(bytes[0]),
                timestamp: LittleEndian::read_u32(&bytes[4..8]),
                raw_value: RawValue::Int24(decode_int24(&bytes[1..4])),
            },
            Layout::Fixed12 => Record {
                channel_id: LittleEndian::read_u32(&bytes[0..4]),
                timestamp: LittleEndian::read_u32(&bytes[4..8]),
                raw_value: RawValue::Float(LittleEndian::read_f32(&bytes[8..12])),
            },
        }
    }
}

impl Iterator for FixedFrames<'_> {
    type Item = Result<ReadingGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let size = self.layout.record_size();
        let remaining = self.data.len() - self.pos;
        if remaining < size {
            self.finished = true;
            if remaining > 0 {
                let diagnostic = Diagnostic::TruncatedTail {
                    offset: self.pos,
                    dropped_bytes: remaining,
                };
                log::warn!("{}", diagnostic);
                self.diagnostics.push(diagnostic);
            }
            return None;
        }

        let offset = self.pos;
        let record = self.parse_record(&self.data[offset..offset + size]);
        self.pos += size;

        let timestamp = self.epoch.apply(record.timestamp);
        log::trace!(
            "Record at offset {}: channel {} raw {} at {} ms",
            offset,
            record.channel_id,
            record.raw_value,
            timestamp
        );

        Some(Ok(ReadingGroup {
            timestamp,
            readings: vec![RawReading {
                offset,
                channel_id: record.channel_id,
                raw_value: record.raw_value,
            }],
        }))
    }
}

impl FrameSource for FixedFrames<'_> {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn bytes_consumed(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record12(id: u32, timestamp: u32, value: f32) -> Vec<u8> {
        [id.to_le_bytes(), timestamp.to_le_bytes(), value.to_le_bytes()].concat()
    }

    #[test]
    fn test_fixed12_with_preamble() {
        let mut data = vec![0xFF; 8];
        data.extend(record12(1, 250, 1.5));
        data.extend(record12(2, 300, -14.7));

        let groups: Vec<ReadingGroup> = FixedFrames::fixed12(&data, false)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].timestamp, 250);
        assert_eq!(groups[0].readings[0].offset, 8);
        assert_eq!(groups[0].readings[0].channel_id, 1);
        assert_eq!(groups[0].readings[0].raw_value, RawValue::Float(1.5));
        assert_eq!(groups[1].timestamp, 300);
        assert_eq!(groups[1].readings[0].raw_value, RawValue::Float(-14.7));
    }

    #[test]
    fn test_fixed12_without_preamble() {
        let data = record12(7, 10, 2.0);
        let group = FixedFrames::fixed12(&data, true).next().unwrap().unwrap();
        assert_eq!(group.timestamp, 0);
        assert_eq!(group.readings[0].offset, 0);
    }

    #[test]
    fn test_fixed12_wide_channel_id_is_kept() {
        let data = [record12(1, 0, 0.5), record12(300, 10, 2.5), record12(1, 20, 0.75)].concat();
        let groups: Vec<ReadingGroup> = FixedFrames::fixed12(&data, false)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].readings[0].channel_id, 300);
        assert_eq!(groups[1].readings[0].offset, 12);
        assert_eq!(groups[1].readings[0].raw_value, RawValue::Float(2.5));
    }

    #[test]
    fn test_fixed8_records() {
        let data = [
            [0x04, 0x80, 0x00, 0x00, 0xE8, 0x03, 0x00, 0x00],
            [0x05, 0x00, 0x00, 0x01, 0xD0, 0x07, 0x00, 0x00],
        ]
        .concat();

        let groups: Vec<ReadingGroup> = FixedFrames::fixed8(&data, true)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(groups[0].timestamp, 0);
        assert_eq!(groups[0].readings[0].channel_id, 4);
        assert_eq!(groups[0].readings[0].raw_value, RawValue::Int24(-8388608));
        assert_eq!(groups[1].timestamp, 1000);
        assert_eq!(groups[1].readings[0].raw_value, RawValue::Int24(1));
    }

    #[test]
    fn test_fixed_truncated_tail() {
        let mut data = vec![0x01, 0x00, 0x00, 0x02, 0x0A, 0x00, 0x00, 0x00];
        data.extend_from_slice(&[0x02, 0x00, 0x00]);

        let mut frames = FixedFrames::fixed8(&data, false);
        assert_eq!(frames.next().unwrap().unwrap().timestamp, 10);
        assert!(frames.next().is_none());
        assert_eq!(
            frames.diagnostics(),
            &[Diagnostic::TruncatedTail {
                offset: 8,
                dropped_bytes: 3
            }]
        );
        assert_eq!(frames.bytes_consumed(), 8);
    }
}
