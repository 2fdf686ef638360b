//! Tuner configuration and persistence.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{gate, pitch, tuning};

/// Tunable constants for an analysis session.
///
/// Every field has a fixed default; hosts normally only change the
/// sensitivity. A config can be saved to and loaded from a JSON file,
/// and missing fields fall back to their defaults on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Initial gate sensitivity, 1 (least) to 100 (most).
    pub sensitivity: u8,
    /// Gate threshold at sensitivity 100.
    pub gate_floor: f32,
    /// Gate threshold at sensitivity 1.
    pub gate_ceiling: f32,
    /// Absolute threshold for the YIN difference search.
    pub yin_threshold: f32,
    /// Lowest reportable frequency in Hz.
    pub min_frequency: f32,
    /// Highest reportable frequency in Hz.
    pub max_frequency: f32,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            sensitivity: 50,
            gate_floor: gate::GATE_FLOOR,
            gate_ceiling: gate::GATE_CEILING,
            yin_threshold: pitch::YIN_THRESHOLD,
            min_frequency: tuning::MIN_FREQUENCY,
            max_frequency: tuning::MAX_FREQUENCY,
        }
    }
}

impl TunerConfig {
    /// Checks that the configured values make sense together.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.sensitivity) {
            bail!("sensitivity must be within 1-100, got {}", self.sensitivity);
        }
        if !(self.gate_floor > 0.0 && self.gate_ceiling > self.gate_floor) {
            bail!(
                "gate thresholds must satisfy 0 < floor < ceiling, got {} and {}",
                self.gate_floor,
                self.gate_ceiling
            );
        }
        if !(self.yin_threshold > 0.0 && self.yin_threshold < 1.0) {
            bail!("YIN threshold must lie in (0, 1), got {}", self.yin_threshold);
        }
        if !(self.min_frequency > 0.0 && self.max_frequency > self.min_frequency) {
            bail!(
                "frequency range must satisfy 0 < min < max, got {} and {}",
                self.min_frequency,
                self.max_frequency
            );
        }
        Ok(())
    }

    /// Loads and validates a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading tuner config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("parsing tuner config from {}", path.display()))?;
        config.validate()?;
        eprintln!("[CONFIG] Loaded tuner config from {}", path.display());
        Ok(config)
    }

    /// Saves the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("serializing tuner config")?;
        fs::write(path, json)
            .with_context(|| format!("writing tuner config to {}", path.display()))?;
        eprintln!("[CONFIG] Saved tuner config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(TunerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = TunerConfig { sensitivity: 0, ..TunerConfig::default() };
        assert!(bad.validate().is_err());

        let bad = TunerConfig { gate_floor: 0.02, ..TunerConfig::default() };
        assert!(bad.validate().is_err());

        let bad = TunerConfig { yin_threshold: 1.5, ..TunerConfig::default() };
        assert!(bad.validate().is_err());

        let bad = TunerConfig { min_frequency: -1.0, ..TunerConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = TunerConfig::default();
        config.sensitivity = 75;

        let path = std::env::temp_dir().join("semitone_config_round_trip.json");
        config.save(&path).expect("save");
        let loaded = TunerConfig::load(&path).expect("load");
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded: TunerConfig = serde_json::from_str(r#"{ "sensitivity": 10 }"#).expect("parse");
        assert_eq!(loaded.sensitivity, 10);
        assert_eq!(loaded.gate_ceiling, TunerConfig::default().gate_ceiling);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join("semitone_config_invalid.json");
        fs::write(&path, r#"{ "sensitivity": 0 }"#).expect("write");
        assert!(TunerConfig::load(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
