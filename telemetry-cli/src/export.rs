//! CSV export of the aligned table and the JSON conversion report

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use telemetry_decoder::{AlignedTable, DecodeStats, DecodedLog, Diagnostic, FramingMode};

/// Write the table as CSV: seconds first, then one column per channel
///
/// Missing values (NaN) are written as empty fields.
pub fn write_csv<W: Write>(table: &AlignedTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.header())?;

    for row in &table.rows {
        let record = std::iter::once(format_value(row.seconds()))
            .chain(row.values.iter().map(|&value| format_value(value)));
        csv_writer.write_record(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Shortest round-trip text, keeping `.0` on whole numbers
fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:?}", value)
    }
}

/// Write the table to a file, or to stdout when no path is given
pub fn export_csv(table: &AlignedTable, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
            write_csv(table, BufWriter::new(file))
                .with_context(|| format!("Failed to write CSV file: {:?}", path))?;
            log::info!("Wrote {} rows to {:?}", table.rows.len(), path);
        }
        None => write_csv(table, io::stdout().lock()).context("Failed to write CSV to stdout")?,
    }
    Ok(())
}

/// Summary of one conversion, serialized as JSON
#[derive(Debug, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub framing: FramingMode,
    pub channels: Vec<String>,
    pub rows: usize,
    pub duration_seconds: f64,
    pub stats: DecodeStats,
    pub diagnostics: Vec<Diagnostic>,
    /// Fatal error that stopped decoding, if partial data was kept
    pub error: Option<String>,
}

impl ConversionReport {
    pub fn new(
        input: &Path,
        framing: FramingMode,
        log: &DecodedLog,
        table: &AlignedTable,
        error: Option<String>,
    ) -> Self {
        Self {
            input: input.to_path_buf(),
            framing,
            channels: table.channels.clone(),
            rows: table.rows.len(),
            duration_seconds: table.duration().num_milliseconds() as f64 / 1000.0,
            stats: log.stats,
            diagnostics: log.diagnostics.clone(),
            error,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn write_report(report: &ConversionReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write report file: {:?}", path))?;
    log::info!("Wrote conversion report to {:?}", path);
    Ok(())
}
