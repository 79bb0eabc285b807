//! Escape-framed log format
//!
//! The stream is a sequence of 4-byte data entries closed by timestamp markers:
//!
//! ```text
//! data entry:  [id] [v2] [v1] [v0]             24-bit signed value, big-endian
//! marker:      [FF] [FF] [FF] [count] [t0] [t1] [t2] [t3]
//! ```
//!
//! The marker's fourth byte is the number of data entries since the previous
//! marker. It must match what the decoder counted, otherwise the stream is out
//! of sync and decoding stops. The timestamp is a little-endian u32 in
//! milliseconds.

use super::{decode_int24, EpochBaseline, FrameSource, ENTRY_SIZE};
use crate::types::{
    ChannelId, Diagnostic, DecoderError, RawReading, RawValue, ReadingGroup, Result,
};
use byteorder::{ByteOrder, LittleEndian};

/// Three 0xFF bytes open a timestamp marker
const MARKER_PREFIX: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Size of the timestamp following a marker header
const TIMESTAMP_SIZE: usize = 4;

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Expecting a data entry or the start of a marker
    ScanningEntry,
    /// A marker header is at the cursor; its count byte is checked next
    ValidatingMarker,
    /// Marker header accepted; the timestamp follows
    ReadingTimestamp,
    /// A framing mismatch was reported (terminal)
    Error,
    /// Input ran out (terminal)
    Exhausted,
}

impl DecodeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DecodeState::Error | DecodeState::Exhausted)
    }
}

/// Iterator over the timestamp groups of an escape-framed buffer
pub struct EscapedFrames<'a> {
    data: &'a [u8],
    pos: usize,
    state: DecodeState,
    /// Readings seen since the last marker
    pending: Vec<RawReading>,
    /// Start of the marker currently being processed
    marker_offset: usize,
    epoch: EpochBaseline,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> EscapedFrames<'a> {
    pub fn new(data: &'a [u8], normalize_epoch: bool) -> Self {
        log::debug!("Decoding {} bytes as escape-framed log", data.len());
        Self {
            data,
            pos: 0,
            state: DecodeState::ScanningEntry,
            pending: Vec::new(),
            marker_offset: 0,
            epoch: EpochBaseline::new(normalize_epoch),
            diagnostics: Vec::new(),
        }
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Stop decoding; everything from `from` on is dropped
    fn exhaust(&mut self, from: usize) {
        let dropped_bytes = self.data.len() - from;
        if dropped_bytes > 0 {
            let diagnostic = Diagnostic::TruncatedTail {
                offset: from,
                dropped_bytes,
            };
            log::warn!("{}", diagnostic);
            self.diagnostics.push(diagnostic);
        }

        if let Some(first) = self.pending.first() {
            let diagnostic = Diagnostic::UnclosedGroup {
                offset: first.offset,
                readings: self.pending.len(),
            };
            log::warn!("{}", diagnostic);
            self.diagnostics.push(diagnostic);
            self.pending.clear();
        }

        self.pos = from;
        self.state = DecodeState::Exhausted;
    }

    fn scan_entry(&mut self) {
        if self.remaining() < ENTRY_SIZE {
            self.exhaust(self.pos);
            return;
        }

        let bytes = &self.data[self.pos..self.pos + ENTRY_SIZE];
        if bytes[..3] == MARKER_PREFIX {
            self.marker_offset = self.pos;
            self.state = DecodeState::ValidatingMarker;
            return;
        }

        let reading = RawReading {
            offset: self.pos,
            channel_id: ChannelId::from(bytes[0]),
            raw_value: RawValue::Int24(decode_int24(&bytes[1..])),
        };
        log::trace!(
            "Entry at offset {}: channel {} raw {}",
            reading.offset,
            reading.channel_id,
            reading.raw_value
        );
        self.pending.push(reading);
        self.pos += ENTRY_SIZE;
    }

    fn validate_marker(&mut self) -> Result<()> {
        let declared = self.data[self.pos + 3];
        let pending = self.pending.len();

        if declared as usize != pending {
            self.state = DecodeState::Error;
            log::error!(
                "Marker at offset {} declares {} readings, {} pending",
                self.marker_offset,
                declared,
                pending
            );
            return Err(DecoderError::FramingMismatch {
                offset: self.marker_offset,
                expected: declared,
                actual: pending,
            });
        }

        self.pos += ENTRY_SIZE;
        self.state = DecodeState::ReadingTimestamp;
        Ok(())
    }

    fn read_timestamp(&mut self) -> Option<ReadingGroup> {
        if self.remaining() < TIMESTAMP_SIZE {
            self.exhaust(self.marker_offset);
            return None;
        }

        let raw = LittleEndian::read_u32(&self.data[self.pos..self.pos + TIMESTAMP_SIZE]);
        self.pos += TIMESTAMP_SIZE;
        self.state = DecodeState::ScanningEntry;

        let timestamp = self.epoch.apply(raw);
        let readings = std::mem::take(&mut self.pending);
        log::debug!(
            "Marker at offset {} closes {} readings at {} ms (raw {})",
            self.marker_offset,
            readings.len(),
            timestamp,
            raw
        );

        Some(ReadingGroup {
            timestamp,
            readings,
        })
    }
}

impl Iterator for EscapedFrames<'_> {
    type Item = Result<ReadingGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                DecodeState::ScanningEntry => self.scan_entry(),
                DecodeState::ValidatingMarker => {
                    if let Err(e) = self.validate_marker() {
                        return Some(Err(e));
                    }
                }
                DecodeState::ReadingTimestamp => {
                    if let Some(group) = self.read_timestamp() {
                        return Some(Ok(group));
                    }
                }
                DecodeState::Error | DecodeState::Exhausted => return None,
            }
        }
    }
}

impl FrameSource for EscapedFrames<'_> {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn bytes_consumed(&self) -> usize {
        self.pos
    }
}
