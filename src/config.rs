//! Configuration for DogMove.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ComputeError;
use crate::gait::DEFAULT_DISTANCE;
use crate::schema::SAMPLE_RATE_HZ;
use crate::types::SignalColumn;

/// Explorer configuration, read from a JSON file.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the DogMove file
    pub data_path: PathBuf,

    /// Field delimiter of the data file (single ASCII character)
    pub delimiter: char,

    /// Sampling rate of the recordings in Hz
    pub sample_rate_hz: f64,

    /// Minimum peak separation used when none is given
    pub default_distance: usize,

    /// Upper bound accepted for the peak separation
    pub max_distance: usize,

    /// Signals plotted when none are selected
    pub default_columns: Vec<SignalColumn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("DogMoveData.csv"),
            delimiter: ',',
            sample_rate_hz: SAMPLE_RATE_HZ,
            default_distance: DEFAULT_DISTANCE,
            max_distance: 100,
            default_columns: SignalColumn::DEFAULT_SELECTION.to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ComputeError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| ComputeError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        self.delimiter_byte()?;

        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ComputeError::ConfigError(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }

        if self.default_distance > self.max_distance {
            return Err(ComputeError::ConfigError(format!(
                "default_distance {} exceeds max_distance {}",
                self.default_distance, self.max_distance
            )));
        }

        Ok(())
    }

    /// The delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8, ComputeError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ComputeError::ConfigError(format!(
                "delimiter must be ASCII, got {:?}",
                self.delimiter
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_rate_hz, 100.0);
        assert_eq!(config.default_distance, 25);
        assert_eq!(config.max_distance, 100);
        assert_eq!(config.default_columns[0], SignalColumn::ANeckRms);
        assert_eq!(config.delimiter_byte().unwrap(), b',');
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{"data_path": "/data/dog/DogMoveData.csv", "default_distance": 15, "default_columns": ["GNeck_RMS"]}"#,
        )
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/data/dog/DogMoveData.csv"));
        assert_eq!(config.default_distance, 15);
        assert_eq!(config.default_columns, vec![SignalColumn::GNeckRms]);
        assert_eq!(config.max_distance, 100);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_json(r#"{"delimiter": "é"}"#).is_err());
        assert!(Config::from_json(r#"{"sample_rate_hz": 0}"#).is_err());
        assert!(Config::from_json(r#"{"default_distance": 150}"#).is_err());
        assert!(Config::from_json(r#"{"default_columns": ["Nope"]}"#).is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/dogmove/config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default();
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }
}
