//! Wire format decoders (escape-framed, fixed-stride)
//!
//! This module contains the frame decoders for the device log formats.
//! Each decoder is an iterator over timestamp groups of raw readings.

use crate::config::FramingMode;
use crate::types::{Diagnostic, Millis, ReadingGroup, Result};
use byteorder::{BigEndian, ByteOrder};

pub mod escaped;
pub mod fixed;

// Re-export decoder types
pub use escaped::{DecodeState, EscapedFrames};
pub use fixed::FixedFrames;

/// Size of a data entry and of a marker header in the escape-framed format
pub const ENTRY_SIZE: usize = 4;

/// Common trait for all frame decoders
///
/// Decoders yield closed groups in stream order. A fatal framing error is
/// yielded once, after which the iterator is finished.
pub trait FrameSource: Iterator<Item = Result<ReadingGroup>> {
    /// Recoverable anomalies seen so far
    fn diagnostics(&self) -> &[Diagnostic];

    /// Offset up to which input has been consumed
    fn bytes_consumed(&self) -> usize;
}

/// Create the frame decoder for a framing mode
pub fn frame_source<'a>(
    framing: FramingMode,
    data: &'a [u8],
    normalize_epoch: bool,
) -> Box<dyn FrameSource + 'a> {
    match framing {
        FramingMode::Escaped => Box::new(EscapedFrames::new(data, normalize_epoch)),
        FramingMode::Fixed8 => Box::new(FixedFrames::fixed8(data, normalize_epoch)),
        FramingMode::Fixed12 => Box::new(FixedFrames::fixed12(data, normalize_epoch)),
    }
}

/// Rebases device timestamps onto the first one seen
#[derive(Debug, Clone, Copy, Default)]
pub struct EpochBaseline {
    enabled: bool,
    baseline: Option<Millis>,
}

impl EpochBaseline {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            baseline: None,
        }
    }

    /// The first raw timestamp seen, once one has been applied
    pub fn baseline(&self) -> Option<Millis> {
        self.baseline
    }

    /// Map a raw device timestamp to the emitted timestamp
    ///
    /// The device clock is a wrapping 32-bit millisecond counter, so the
    /// difference is taken modulo 2^32.
    pub fn apply(&mut self, raw: Millis) -> Millis {
        if !self.enabled {
            return raw;
        }
        let baseline = *self.baseline.get_or_insert(raw);
        raw.wrapping_sub(baseline)
    }
}

/// Decode a 24-bit big-endian two's-complement integer
pub fn decode_int24(bytes: &[u8]) -> i32 {
    sign_extend_24bit(BigEndian::read_u24(bytes))
}

/// Sign-extend a 24-bit value held in the low bits of a u32
pub fn sign_extend_24bit(value: u32) -> i32 {
    if (value & 0x80_0000) != 0 {
        value as i32 - 0x100_0000
    } else {
        value as i32
    }
}
