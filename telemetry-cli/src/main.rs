//! Telemetry Decoder CLI Application
//!
//! This is the command-line interface for the binary telemetry decoder.
//! It uses the telemetry-decoder library and adds:
//! - TOML configuration of framing and channel tables
//! - CSV export of the aligned table
//! - JSON conversion reports

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use telemetry_decoder::{DecodeOutcome, Decoder, FramingMode, LeadingFill};

mod config;
mod export;

use config::{AppConfig, Preset};
use export::ConversionReport;

/// Telemetry Decoder - Convert binary sensor logs to CSV
#[derive(Parser, Debug)]
#[command(name = "telemetry-cli")]
#[command(about = "Decode binary telemetry logs into time-aligned CSV", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the binary log file to decode
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output CSV file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Wire format of the log
    #[arg(long, value_enum)]
    framing: Option<FramingArg>,

    /// Built-in channel table
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Rebase timestamps onto the first one (default depends on framing)
    #[arg(long, value_name = "BOOL")]
    normalize_epoch: Option<bool>,

    /// Value shown for a channel before its first sample
    #[arg(long, value_enum)]
    leading_fill: Option<LeadingFillArg>,

    /// Write a JSON conversion report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Export the data decoded before a fatal framing error
    #[arg(long)]
    keep_partial: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FramingArg {
    Escaped,
    Fixed8,
    Fixed12,
}

impl From<FramingArg> for FramingMode {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Escaped => FramingMode::Escaped,
            FramingArg::Fixed8 => FramingMode::Fixed8,
            FramingArg::Fixed12 => FramingMode::Fixed12,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    FlightLogger,
    LegacyLogger,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::FlightLogger => Preset::FlightLogger,
            PresetArg::LegacyLogger => Preset::LegacyLogger,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LeadingFillArg {
    FirstKnown,
    Missing,
}

impl From<LeadingFillArg> for LeadingFill {
    fn from(arg: LeadingFillArg) -> Self {
        match arg {
            LeadingFillArg::FirstKnown => LeadingFill::FirstKnown,
            LeadingFillArg::Missing => LeadingFill::Missing,
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Telemetry Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", telemetry_decoder::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    let config = apply_overrides(config, &args);

    convert(&args.input, &config, args.keep_partial)
}

/// Command-line flags take precedence over file values
fn apply_overrides(mut config: AppConfig, args: &Args) -> AppConfig {
    if let Some(framing) = args.framing {
        config.decoder.framing = framing.into();
    }
    if let Some(preset) = args.preset {
        config.preset = Some(preset.into());
        config.channels.clear();
    }
    if let Some(enabled) = args.normalize_epoch {
        config.decoder.normalize_epoch = Some(enabled);
    }
    if let Some(fill) = args.leading_fill {
        config.output.leading_fill = fill.into();
    }
    if args.output.is_some() {
        config.output.csv = args.output.clone();
    }
    if args.report.is_some() {
        config.output.report = args.report.clone();
    }
    config
}

/// Decode one log and write the configured outputs
fn convert(input: &Path, config: &AppConfig, keep_partial: bool) -> Result<()> {
    let decoder = Decoder::new(config.registry()?);
    let decoder_config = config.decoder_config();

    let data =
        std::fs::read(input).with_context(|| format!("Failed to read log file: {:?}", input))?;

    let DecodeOutcome { log: decoded, error } = decoder.decode_partial(&data, &decoder_config);
    let error = match error {
        Some(e) if !keep_partial => {
            return Err(e).with_context(|| format!("Failed to decode {:?}", input));
        }
        Some(e) => {
            log::warn!("Keeping {} groups decoded before the error", decoded.stats.groups);
            Some(e)
        }
        None => None,
    };

    let table = decoded.to_table(decoder_config.leading_fill);
    export::export_csv(&table, config.output.csv.as_deref())?;

    if let Some(report_path) = &config.output.report {
        let report = ConversionReport::new(
            input,
            decoder_config.framing,
            &decoded,
            &table,
            error.as_ref().map(ToString::to_string),
        );
        export::write_report(&report, report_path)?;
    }

    match error {
        Some(e) => Err(e).with_context(|| format!("Log {:?} was only partially decoded", input)),
        None => Ok(()),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
