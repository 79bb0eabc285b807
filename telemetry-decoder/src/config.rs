//! Decoder configuration types
//!
//! This module defines the configuration needed by the decoder library: which
//! wire format the buffer uses, whether timestamps are rebased onto the first
//! marker, and how the resampler fills values before a channel's first sample.

use serde::{Deserialize, Serialize};

/// Wire format of the device log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramingMode {
    /// 4-byte data entries closed by validated `0xFFFFFF` timestamp markers
    #[default]
    Escaped,
    /// 8-byte records: id, 24-bit value, 32-bit timestamp
    Fixed8,
    /// 12-byte records: 32-bit id, 32-bit timestamp, 32-bit float value
    Fixed12,
}

impl FramingMode {
    /// Whether timestamps are rebased onto the first one when not configured
    pub fn normalizes_epoch_by_default(&self) -> bool {
        matches!(self, FramingMode::Escaped)
    }
}

/// How the resampler fills a channel before its first sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadingFill {
    /// Use the first known value (legacy reader behaviour)
    #[default]
    FirstKnown,
    /// Emit NaN until the channel has a sample
    Missing,
}

/// Configuration for the decoder library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Wire format of the input buffer
    #[serde(default)]
    pub framing: FramingMode,

    /// Rebase timestamps onto the first one (None = format default)
    #[serde(default)]
    pub normalize_epoch: Option<bool>,

    /// Fill policy for rows before a channel's first sample
    #[serde(default)]
    pub leading_fill: LeadingFill,
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: select the wire format
    pub fn with_framing(mut self, framing: FramingMode) -> Self {
        self.framing = framing;
        self
    }

    /// Builder method: force epoch normalization on or off
    pub fn with_epoch_normalization(mut self, enabled: bool) -> Self {
        self.normalize_epoch = Some(enabled);
        self
    }

    /// Builder method: select the leading fill policy
    pub fn with_leading_fill(mut self, leading_fill: LeadingFill) -> Self {
        self.leading_fill = leading_fill;
        self
    }

    /// Effective epoch normalization for the selected framing
    pub fn normalizes_epoch(&self) -> bool {
        self.normalize_epoch
            .unwrap_or_else(|| self.framing.normalizes_epoch_by_default())
    }
}
