//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use telemetry_decoder::{ChannelDef, ChannelRegistry, DecoderConfig, FramingMode, LeadingFill};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Built-in channel table, used when no channels are listed
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub decoder: DecoderSection,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub channels: Vec<ChannelDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    FlightLogger,
    LegacyLogger,
}

impl Preset {
    pub fn registry(&self) -> ChannelRegistry {
        match self {
            Preset::FlightLogger => ChannelRegistry::flight_logger(),
            Preset::LegacyLogger => ChannelRegistry::legacy_logger(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DecoderSection {
    #[serde(default)]
    pub framing: FramingMode,
    /// Unset means the framing's default
    pub normalize_epoch: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// CSV destination (default: stdout)
    pub csv: Option<PathBuf>,
    /// JSON conversion report destination
    pub report: Option<PathBuf>,
    #[serde(default)]
    pub leading_fill: LeadingFill,
}

impl AppConfig {
    /// Library configuration derived from the file settings
    pub fn decoder_config(&self) -> DecoderConfig {
        let config = DecoderConfig::new()
            .with_framing(self.decoder.framing)
            .with_leading_fill(self.output.leading_fill);

        match self.decoder.normalize_epoch {
            Some(enabled) => config.with_epoch_normalization(enabled),
            None => config,
        }
    }

    /// Channel registry: explicit channels, then the preset, then the table
    /// matching the framing
    pub fn registry(&self) -> Result<ChannelRegistry> {
        if !self.channels.is_empty() {
            if self.preset.is_some() {
                log::warn!("Both a preset and [[channels]] are configured, using [[channels]]");
            }
            return ChannelRegistry::from_defs(self.channels.iter().cloned())
                .context("Invalid [[channels]] configuration");
        }

        let preset = self.preset.unwrap_or(match self.decoder.framing {
            FramingMode::Fixed12 => Preset::LegacyLogger,
            FramingMode::Escaped | FramingMode::Fixed8 => Preset::FlightLogger,
        });
        log::debug!("Using {:?} channel table", preset);
        Ok(preset.registry())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [decoder]
            framing = "fixed8"
            normalize_epoch = true

            [output]
            csv = "flight.csv"
            leading_fill = "missing"

            [[channels]]
            id = 3
            name = "Accel X"
            multiplier = 2.0

            [[channels]]
            id = 10
            name = "Interior Temperature (C)"
            multiplier = 0.00390625
            additive = 25.0
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.decoder.framing, FramingMode::Fixed8);
        assert_eq!(config.output.csv, Some(PathBuf::from("flight.csv")));
        assert_eq!(config.output.leading_fill, LeadingFill::Missing);
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[1].additive, 25.0);

        let decoder_config = config.decoder_config();
        assert!(decoder_config.normalizes_epoch());
        assert_eq!(decoder_config.leading_fill, LeadingFill::Missing);

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(3).unwrap().multiplier, 2.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.decoder.framing, FramingMode::Escaped);
        assert!(config.decoder_config().normalizes_epoch());
        assert_eq!(config.registry().unwrap().len(), 12);
    }

    #[test]
    fn test_preset_selection() {
        let config: AppConfig = toml::from_str(
            r#"
            preset = "legacy_logger"

            [decoder]
            framing = "escaped"
        "#,
        )
        .unwrap();
        assert_eq!(config.preset, Some(Preset::LegacyLogger));
        assert_eq!(config.registry().unwrap().len(), 2);

        let fixed12: AppConfig = toml::from_str("[decoder]\nframing = \"fixed12\"").unwrap();
        assert!(fixed12.registry().unwrap().contains(2));
        assert!(!fixed12.decoder_config().normalizes_epoch());
    }

    #[test]
    fn test_duplicate_channels_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
            [[channels]]
            id = 1
            name = "A"

            [[channels]]
            id = 1
            name = "B"
        "#,
        )
        .unwrap();
        assert!(config.registry().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nreport = \"report.json\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output.report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn test_load_config_reports_path() {
        let err = load_config(Path::new("missing-config.toml")).unwrap_err();
        assert!(err.to_string().contains("missing-config.toml"));
    }
}
