//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct holds the channel registry and turns a log buffer into
//! per-channel series, which can then be aligned into a table.

use crate::channels::ChannelRegistry;
use crate::config::{DecoderConfig, LeadingFill};
use crate::formats::frame_source;
use crate::resample::Resampler;
use crate::samples::{ChannelSeries, SampleBuilder};
use crate::types::{AlignedTable, DecodeStats, DecoderError, Diagnostic, ReadingGroup, Result};
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
pub struct Decoder {
    /// Channel definitions used to name and scale readings
    registry: ChannelRegistry,
}

/// Everything recovered from one decode pass
#[derive(Debug, Clone, Default)]
pub struct DecodedLog {
    /// Scaled samples per channel
    pub series: ChannelSeries,
    /// Recoverable anomalies in stream order
    pub diagnostics: Vec<Diagnostic>,
    pub stats: DecodeStats,
}

impl DecodedLog {
    /// Align all channels onto the observed timestamps
    pub fn to_table(&self, leading_fill: LeadingFill) -> AlignedTable {
        Resampler::new(leading_fill).resample(&self.series)
    }
}

/// Result of a decode pass that may have stopped on a fatal error
///
/// `log` holds every group closed before the error, so the caller can decide
/// whether partial data is worth keeping.
#[derive(Debug)]
pub struct DecodeOutcome {
    pub log: DecodedLog,
    pub error: Option<DecoderError>,
}

impl DecodeOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discard partial data on error
    pub fn into_result(self) -> Result<DecodedLog> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.log),
        }
    }
}

impl Decoder {
    /// Create a decoder over a channel registry
    pub fn new(registry: ChannelRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Decode a buffer, keeping whatever was decoded before a fatal error
    pub fn decode_partial(&self, data: &[u8], config: &DecoderConfig) -> DecodeOutcome {
        log::info!(
            "Decoding {} bytes ({:?} framing, epoch normalization {})",
            data.len(),
            config.framing,
            if config.normalizes_epoch() { "on" } else { "off" }
        );

        let mut frames = frame_source(config.framing, data, config.normalizes_epoch());
        let mut builder = SampleBuilder::new();
        let mut unknown = Vec::new();
        let mut stats = DecodeStats::default();
        let mut error = None;

        for group in frames.by_ref() {
            match group {
                Ok(group) => {
                    stats.readings += self.record_group(&group, &mut builder, &mut unknown);
                    stats.groups += 1;
                }
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }

        stats.bytes_consumed = frames.bytes_consumed();
        let diagnostics = merge_diagnostics(unknown, frames.diagnostics());
        let series = builder.finish();

        match &error {
            Some(e) => log::error!("Decoding stopped after {} groups: {}", stats.groups, e),
            None => log::info!(
                "Decoded {} readings in {} groups across {} channels ({} diagnostics)",
                stats.readings,
                stats.groups,
                series.series.len(),
                diagnostics.len()
            ),
        }

        DecodeOutcome {
            log: DecodedLog {
                series,
                diagnostics,
                stats,
            },
            error,
        }
    }

    /// Decode a buffer; a fatal framing error discards everything
    pub fn decode_bytes(&self, data: &[u8], config: &DecoderConfig) -> Result<DecodedLog> {
        self.decode_partial(data, config).into_result()
    }

    /// Read a log file and decode it
    pub fn decode_file(&self, path: &Path, config: &DecoderConfig) -> Result<DecodedLog> {
        log::info!("Reading log file: {:?}", path);
        let data = std::fs::read(path)?;
        self.decode_bytes(&data, config)
    }

    /// Decode and align in one step
    pub fn convert_bytes(&self, data: &[u8], config: &DecoderConfig) -> Result<AlignedTable> {
        let decoded = self.decode_bytes(data, config)?;
        Ok(decoded.to_table(config.leading_fill))
    }

    /// Scale every reading of a closed group and record it; every group is a row
    fn record_group(
        &self,
        group: &ReadingGroup,
        builder: &mut SampleBuilder,
        unknown: &mut Vec<Diagnostic>,
    ) -> usize {
        builder.mark_timestamp(group.timestamp);
        for reading in &group.readings {
            let channel = self.registry.lookup(reading.channel_id);
            if channel.is_fallback() {
                unknown.push(Diagnostic::UnknownChannel {
                    offset: reading.offset,
                    channel_id: reading.channel_id,
                });
            }
            builder.record(
                &channel.name,
                group.timestamp,
                channel.scale(reading.raw_value.as_f64()),
            );
        }
        group.readings.len()
    }
}

/// Combine unknown-channel and framing diagnostics in stream order
fn merge_diagnostics(mut unknown: Vec<Diagnostic>, framing: &[Diagnostic]) -> Vec<Diagnostic> {
    unknown.extend_from_slice(framing);
    unknown.sort_by_key(diagnostic_offset);
    unknown
}

fn diagnostic_offset(diagnostic: &Diagnostic) -> usize {
    match diagnostic {
        Diagnostic::UnknownChannel { offset, .. }
        | Diagnostic::TruncatedTail { offset, .. }
        | Diagnostic::UnclosedGroup { offset, .. } => *offset,
    }
}
