//! Log encoder
//!
//! Produces buffers that are wire-identical to what the logger firmwares
//! write. Used to build fixtures and to re-encode decoded readings.

use crate::types::{DecoderError, Millis, Result};

/// Channel id reserved for marker headers
pub const RESERVED_CHANNEL_ID: u8 = 0xFF;

const INT24_MIN: i32 = -(1 << 23);
const INT24_MAX: i32 = (1 << 23) - 1;

/// Writer for the escape-framed format
#[derive(Debug, Default)]
pub struct FrameEncoder {
    bytes: Vec<u8>,
    pending: usize,
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a data entry to the open group
    pub fn write_entry(&mut self, channel_id: u8, raw_value: i32) -> Result<()> {
        if channel_id == RESERVED_CHANNEL_ID {
            return Err(DecoderError::InvalidData(format!(
                "channel id 0x{:X} is reserved for markers",
                channel_id
            )));
        }
        if !(INT24_MIN..=INT24_MAX).contains(&raw_value) {
            return Err(DecoderError::InvalidData(format!(
                "value {} does not fit in 24 bits",
                raw_value
            )));
        }

        let value = (raw_value as u32) & 0xFF_FFFF;
        self.bytes.push(channel_id);
        self.bytes.extend_from_slice(&value.to_be_bytes()[1..]);
        self.pending += 1;
        Ok(())
    }

    /// Close the open group with a timestamp marker
    pub fn write_marker(&mut self, timestamp: Millis) -> Result<()> {
        let count = u8::try_from(self.pending).map_err(|_| {
            DecoderError::InvalidData(format!(
                "{} entries exceed the marker count limit of {}",
                self.pending,
                u8::MAX
            ))
        })?;

        self.bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, count]);
        self.bytes.extend_from_slice(&timestamp.to_le_bytes());
        self.pending = 0;
        Ok(())
    }

    /// Write a whole group: entries followed by their marker
    pub fn write_group(&mut self, timestamp: Millis, readings: &[(u8, i32)]) -> Result<()> {
        for &(channel_id, raw_value) in readings {
            self.write_entry(channel_id, raw_value)?;
        }
        self.write_marker(timestamp)
    }

    /// Entries written since the last marker
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Preamble written at the start of 12-byte logs
pub const FIXED12_PREAMBLE: [u8; 8] = [0xFF; 8];

/// Encode one 8-byte record
pub fn encode_fixed8(channel_id: u8, timestamp: Millis, raw_value: i32) -> Result<[u8; 8]> {
    if !(INT24_MIN..=INT24_MAX).contains(&raw_value) {
        return Err(DecoderError::InvalidData(format!(
            "value {} does not fit in 24 bits",
            raw_value
        )));
    }

    let value = ((raw_value as u32) & 0xFF_FFFF).to_be_bytes();
    let ts = timestamp.to_le_bytes();
    Ok([
        channel_id, value[1], value[2], value[3], ts[0], ts[1], ts[2], ts[3],
    ])
}

/// Encode one 12-byte record
pub fn encode_fixed12(id: u32, timestamp: Millis, value: f32) -> [u8; 12] {
    let mut record = [0u8; 12];
    record[0..4].copy_from_slice(&id.to_le_bytes());
    record[4..8].copy_from_slice(&timestamp.to_le_bytes());
    record[8..12].copy_from_slice(&value.to_le_bytes());
    record
}
