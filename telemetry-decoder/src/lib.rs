//! Telemetry Decoder Library
//!
//! A stateless, reusable library for decoding binary sensor logs written by
//! embedded loggers into time-aligned, physically scaled tables.
//!
//! # Architecture
//!
//! Decoding runs in stages:
//! - A frame decoder walks the buffer and yields timestamp groups of raw readings
//! - The channel registry resolves each id to a name and a linear scaling
//! - The sample builder collects one ordered series per channel
//! - The resampler aligns every channel onto the observed timestamps
//!
//! The library does NOT:
//! - Write CSV or any other output format
//! - Load configuration files
//! - Stream input incrementally
//!
//! Output and configuration handling live in the application layer (telemetry-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use telemetry_decoder::{ChannelRegistry, Decoder, DecoderConfig, FramingMode};
//! use std::path::Path;
//!
//! let decoder = Decoder::new(ChannelRegistry::flight_logger());
//! let config = DecoderConfig::new().with_framing(FramingMode::Escaped);
//!
//! let log = decoder.decode_file(Path::new("flight.bin"), &config).unwrap();
//! for diagnostic in &log.diagnostics {
//!     eprintln!("warning: {}", diagnostic);
//! }
//!
//! let table = log.to_table(config.leading_fill);
//! for row in &table.rows {
//!     println!("{:.3} {:?}", row.seconds(), row.values);
//! }
//! ```

// Public modules
pub mod channels;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod formats;
pub mod resample;
pub mod samples;
pub mod types;

// Re-export main types for convenience
pub use channels::{ChannelDef, ChannelRegistry};
pub use config::{DecoderConfig, FramingMode, LeadingFill};
pub use decoder::{DecodeOutcome, DecodedLog, Decoder};
pub use resample::Resampler;
pub use samples::{ChannelSeries, SampleBuilder, TimeSeries};
pub use types::{
    AlignedRow, AlignedTable, ChannelId, DecodeStats, DecoderError, Diagnostic, Millis,
    RawReading, RawValue, ReadingGroup, Result, Sample, TIMESTAMP_HEADER,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
