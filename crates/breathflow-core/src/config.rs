//! Pipeline configuration
//!
//! All tuning constants of the inference pipeline live here as serde-derived
//! structs so a session can be persisted and recalibrated without touching
//! code. The defaults are the calibrated values of the reference hardware
//! setup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid configuration JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Two-stage smoother settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SmootherConfig {
    /// Weight of the incoming sample in the level-1 EMA (history keeps 1 - alpha)
    pub level1_alpha: f32,
    /// Weight of the level-1 value in the level-2 EMA
    pub level2_alpha: f32,
    /// Maximum number of samples kept per series
    pub history_len: usize,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            level1_alpha: 0.1,
            level2_alpha: 0.05,
            history_len: 100,
        }
    }
}

/// Phase detector settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DetectorConfig {
    /// Minimum level-2 excursion above the previous value to trigger an inhale
    pub threshold: f32,
    /// Fraction of `threshold` used for the exhale trigger.
    ///
    /// Exhale acoustic signatures are sharper than inhales, so a smaller
    /// negative excursion is sufficient evidence. Calibration constant, not a
    /// physical law.
    pub exhale_factor: f32,
    /// Minimum dwell time between consecutive transitions, in milliseconds
    pub debounce_ms: u64,
}

impl DetectorConfig {
    /// Debounce interval as a [`Duration`]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 8.0,
            exhale_factor: 0.7,
            debounce_ms: 1000,
        }
    }
}

/// Ratio estimator settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatioConfig {
    /// Lower clamp for the reported ratio
    pub min_ratio: f32,
    /// Upper clamp for the reported ratio
    pub max_ratio: f32,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            min_ratio: 0.1,
            max_ratio: 10.0,
        }
    }
}

/// Top-level pipeline configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BreathConfig {
    /// Smoother settings
    #[serde(default)]
    pub smoother: SmootherConfig,
    /// Detector settings
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Ratio settings
    #[serde(default)]
    pub ratio: RatioConfig,
}

impl BreathConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
