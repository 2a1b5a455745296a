//! Runtime configuration, read from a JSON file. Every field has a default,
//! so a config file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use log::warn;

use crate::error::{PianoError, Result};
use crate::mapping::{MAX_TOTAL_KEYS, MAX_VOLUME, MIN_VOLUME, TOTAL_KEYS};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PianoConfig {
    pub mapping: MappingConfig,
    pub audio: AudioConfig,
    pub ticker: TickerConfig,
    pub feed: FeedConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MappingConfig {
    pub total_keys: usize,
    pub min_volume: f64,
    pub max_volume: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            total_keys: TOTAL_KEYS,
            min_volume: MIN_VOLUME,
            max_volume: MAX_VOLUME,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    /// Master volume, 0.0 to 1.0.
    pub volume: f32,
    pub sound_enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            volume: 0.5,
            sound_enabled: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TickerConfig {
    /// Percent rise between two quotes that raises a buy alert.
    pub buy_threshold: f64,
    /// Percent drop between two quotes that raises a sell alert.
    pub sell_threshold: f64,
    pub update_interval_secs: u64,
    pub max_data_points: usize,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            buy_threshold: 1.0,
            sell_threshold: 1.0,
            update_interval_secs: 10,
            max_data_points: 50,
        }
    }
}

impl TickerConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs.max(1))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub reconnect_delay_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { reconnect_delay_secs: 5 }
    }
}

impl FeedConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl PianoConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Could not read config {}: {}, using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mapping = &self.mapping;
        if !(2..=MAX_TOTAL_KEYS).contains(&mapping.total_keys) {
            return Err(PianoError::InvalidConfiguration(format!(
                "mapping.total_keys must be between 2 and {}, got {}",
                MAX_TOTAL_KEYS, mapping.total_keys
            )));
        }
        if !(mapping.min_volume > 0.0 && mapping.min_volume < mapping.max_volume && mapping.max_volume.is_finite()) {
            return Err(PianoError::InvalidConfiguration(format!(
                "mapping volumes must satisfy 0 < min_volume < max_volume, got {} and {}",
                mapping.min_volume, mapping.max_volume
            )));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(PianoError::InvalidConfiguration(format!(
                "audio.volume must be between 0 and 1, got {}",
                self.audio.volume
            )));
        }
        if self.audio.sample_rate == 0 {
            return Err(PianoError::InvalidConfiguration("audio.sample_rate must be positive".to_string()));
        }
        if self.ticker.buy_threshold < 0.0 || self.ticker.sell_threshold < 0.0 {
            return Err(PianoError::InvalidConfiguration("ticker thresholds must not be negative".to_string()));
        }
        if self.ticker.max_data_points < 2 {
            return Err(PianoError::InvalidConfiguration(
                "ticker.max_data_points must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
