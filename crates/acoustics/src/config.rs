//! Configuration System
//!
//! Loads run parameters from acoustics.toml. Every section and field is
//! optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use sound_events::Season;

use crate::systems::ambient::Weather;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "acoustics.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcousticsConfig {
    pub simulation: SimulationConfig,
    pub weather: WeatherConfig,
    pub audio: AudioConfig,
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub turns: u64,
    /// Side of the local map in submaps
    pub map_submaps: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            turns: 100,
            map_submaps: 3,
        }
    }
}

/// Weather at the start of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Noise of the weather itself, in dB
    pub sound_attn_db: i32,
    pub windspeed_mph: i32,
    pub season: Season,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            sound_attn_db: 0,
            windspeed_mph: 5,
            season: Season::Summer,
        }
    }
}

impl WeatherConfig {
    pub fn to_weather(&self) -> Weather {
        Weather {
            sound_attn_db: self.sound_attn_db,
            windspeed_mph: self.windspeed_mph,
            season: self.season,
        }
    }
}

/// Audio cue dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sfx_volume_multiplier: f32,
    /// Start the cue worker; without it cues are dropped
    pub worker_enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sfx_volume_multiplier: 1.0,
            worker_enabled: false,
        }
    }
}

impl AcousticsConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse configuration from TOML text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        if !Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::default();
        }
        Self::from_file(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            warn!(error = %e, path = DEFAULT_CONFIG_PATH, "Could not load config, using defaults");
            Self::default()
        })
    }
}

/// The default configuration as TOML, for writing a starter file.
pub fn default_config_toml() -> Result<String, ConfigError> {
    AcousticsConfig::default().to_toml()
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AcousticsConfig::default();
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.map_submaps, 3);
        assert_eq!(config.weather.season, Season::Summer);
        assert!(!config.audio.worker_enabled);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AcousticsConfig::from_str(
            r#"
            [simulation]
            seed = 7

            [weather]
            windspeed_mph = 30
            season = "winter"
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.turns, 100);
        assert_eq!(config.weather.windspeed_mph, 30);
        assert_eq!(config.weather.to_weather().season, Season::Winter);
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn test_default_toml_parses_back() {
        let text = default_config_toml().unwrap();
        assert!(text.contains("[simulation]"));
        assert_eq!(AcousticsConfig::from_str(&text).unwrap(), AcousticsConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[audio]\nsfx_volume_multiplier = 0.5").unwrap();
        let config = AcousticsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.audio.sfx_volume_multiplier, 0.5);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(matches!(
            AcousticsConfig::from_str("[simulation]\nseed = \"many\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AcousticsConfig::from_file("/nonexistent/acoustics.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
