//! Standalone telemetry log decoder
//!
//! Decodes a binary flight log with the built-in channel tables and prints a
//! summary followed by the first rows of the aligned table.
//!
//! Usage:
//!   decode_binlog <log_file> [--framing escaped|fixed8|fixed12] [--limit <rows>]
//!
//! Example:
//!   decode_binlog flight.bin --framing escaped --limit 20

use std::env;
use std::path::PathBuf;
use telemetry_decoder::{ChannelRegistry, Decoder, DecoderConfig, FramingMode};

fn parse_framing(value: &str) -> Option<FramingMode> {
    match value {
        "escaped" => Some(FramingMode::Escaped),
        "fixed8" => Some(FramingMode::Fixed8),
        "fixed12" => Some(FramingMode::Fixed12),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <log_file> [--framing escaped|fixed8|fixed12] [--limit <rows>]",
            args[0]
        );
        std::process::exit(1);
    }

    let log_path = PathBuf::from(&args[1]);
    let mut framing = FramingMode::Escaped;
    let mut limit = 10usize;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--framing" if i + 1 < args.len() => {
                framing = parse_framing(&args[i + 1]).unwrap_or_else(|| {
                    eprintln!("Unknown framing: {}", args[i + 1]);
                    std::process::exit(1);
                });
                i += 2;
            }
            "--limit" if i + 1 < args.len() => {
                limit = args[i + 1].parse().unwrap_or(limit);
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    let registry = match framing {
        FramingMode::Fixed12 => ChannelRegistry::legacy_logger(),
        _ => ChannelRegistry::flight_logger(),
    };
    let decoder = Decoder::new(registry);
    let config = DecoderConfig::new().with_framing(framing);

    let log = match decoder.decode_file(&log_path, &config) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to decode {:?}: {}", log_path, e);
            std::process::exit(1);
        }
    };

    let table = log.to_table(config.leading_fill);

    println!("\n=== DECODING SUMMARY ===");
    println!("Bytes consumed: {}", log.stats.bytes_consumed);
    println!("Groups: {}", log.stats.groups);
    println!("Readings: {}", log.stats.readings);
    println!("Channels: {}", table.channels.len());
    println!("Rows: {}", table.rows.len());
    println!("Duration: {:.3} s", table.duration().num_milliseconds() as f64 / 1000.0);

    if !log.diagnostics.is_empty() {
        println!("\nDiagnostics:");
        for diagnostic in &log.diagnostics {
            println!("  {}", diagnostic);
        }
    }

    println!("\n{}", table.header().join(" | "));
    for row in table.rows.iter().take(limit) {
        let values: Vec<String> = row.values.iter().map(|v| format!("{:.4}", v)).collect();
        println!("{:.3} | {}", row.seconds(), values.join(" | "));
    }
}
