//! Core types for the telemetry decoder library
//!
//! This module defines the values that flow between the decoding stages: raw
//! readings produced by the frame decoders, physical samples, the aligned
//! output table, recoverable diagnostics and fatal errors.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric channel identifier as written by the device
///
/// One byte in escape-framed and 8-byte logs, 32 bits in 12-byte records.
pub type ChannelId = u32;

/// Device time in milliseconds
pub type Millis = u32;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Header label of the time column in exported tables
pub const TIMESTAMP_HEADER: &str = "Timestamp (s)";

/// Raw value carried by a data entry, before scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    /// 24-bit two's-complement integer widened to 32 bits
    Int24(i32),
    /// IEEE-754 single precision value (12-byte legacy records)
    Float(f32),
}

impl RawValue {
    /// Convert to f64 for scaling
    pub fn as_f64(&self) -> f64 {
        match self {
            RawValue::Int24(v) => *v as f64,
            RawValue::Float(v) => *v as f64,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int24(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{:.3}", v),
        }
    }
}

/// A single data entry read from the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    /// Byte offset of the entry in the input buffer
    pub offset: usize,
    pub channel_id: ChannelId,
    pub raw_value: RawValue,
}

/// A run of readings closed by one timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingGroup {
    /// Stream-relative (or raw, when normalization is off) timestamp
    pub timestamp: Millis,
    pub readings: Vec<RawReading>,
}

/// A measurement in physical units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub channel_name: String,
    pub timestamp: Millis,
    pub value: f64,
}

/// One output row: a timestamp and one value per channel column
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub timestamp: Millis,
    pub values: Vec<f64>,
}

impl AlignedRow {
    /// Timestamp converted from milliseconds to seconds
    pub fn seconds(&self) -> f64 {
        self.timestamp as f64 / 1000.0
    }
}

/// Time-aligned multi-channel table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTable {
    /// Channel column names, sorted lexicographically
    pub channels: Vec<String>,
    /// Rows in ascending timestamp order
    pub rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row: time column followed by the channel names
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(TIMESTAMP_HEADER)
            .chain(self.channels.iter().map(String::as_str))
            .collect()
    }

    /// Column index of a channel
    pub fn column(&self, channel_name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == channel_name)
    }

    /// All values of one channel, top to bottom
    pub fn column_values(&self, channel_name: &str) -> Option<Vec<f64>> {
        let index = self.column(channel_name)?;
        Some(self.rows.iter().map(|row| row.values[index]).collect())
    }

    /// Time covered between the first and last row
    pub fn duration(&self) -> TimeDelta {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => {
                TimeDelta::milliseconds(last.timestamp as i64 - first.timestamp as i64)
            }
            _ => TimeDelta::zero(),
        }
    }
}

/// Recoverable anomalies found while decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Channel id missing from the registry; a fallback definition was used
    UnknownChannel { offset: usize, channel_id: ChannelId },
    /// Buffer ended inside an entry, marker or record; the bytes were dropped
    TruncatedTail { offset: usize, dropped_bytes: usize },
    /// Data entries at the end of the stream were never closed by a marker
    UnclosedGroup { offset: usize, readings: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownChannel { offset, channel_id } => write!(
                f,
                "unknown channel id {} at offset {}, using identity scaling",
                channel_id, offset
            ),
            Diagnostic::TruncatedTail {
                offset,
                dropped_bytes,
            } => write!(
                f,
                "truncated data at offset {}, dropped {} trailing bytes",
                offset, dropped_bytes
            ),
            Diagnostic::UnclosedGroup { offset, readings } => write!(
                f,
                "{} readings from offset {} have no timestamp marker, discarded",
                readings, offset
            ),
        }
    }
}

/// Counters collected during one decode pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Bytes consumed as complete entries, markers or records
    pub bytes_consumed: usize,
    /// Timestamp groups closed and recorded
    pub groups: usize,
    /// Readings recorded into the sample builder
    pub readings: usize,
}

/// Errors that stop decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error(
        "Framing mismatch at offset {offset}: marker declares {expected} readings but {actual} are pending"
    )]
    FramingMismatch {
        offset: usize,
        expected: u8,
        actual: usize,
    },

    #[error("Duplicate channel definition for id {0}")]
    DuplicateChannel(ChannelId),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
