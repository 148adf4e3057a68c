//! Application configuration: pipeline, link and logging settings in one
//! JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use breathflow_control::LinkConfig;
use breathflow_core::{BreathConfig, LogConfig};

/// Everything the binary needs to run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inference pipeline settings
    #[serde(default)]
    pub pipeline: BreathConfig,
    /// Actuator link settings
    #[serde(default)]
    pub link: LinkConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

impl AppConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path:?}"))
    }

    /// Load from a file when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
