//! Logging configuration
//!
//! Holds the persisted logging settings; the binary wires these into its
//! tracing subscriber at startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging settings persisted alongside the pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Default log level ("trace", "debug", "info", "warn", "error")
    pub level: String,
    /// Mirror logs to stderr
    pub console_output: bool,
    /// Write logs to a dated file under `log_dir`
    pub file_output: bool,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// How many old log files to keep
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            max_log_files: 5,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, defaulting to INFO if invalid
    pub fn parse_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }

    /// Path of the log file for the current date
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir.join(format!("breathflow_{date}.log"))
    }

    /// Create the log directory if missing
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
    }

    /// Delete the oldest log files beyond the retention count
    pub fn cleanup_old_logs(&self) -> std::io::Result<()> {
        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "log")
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("breathflow_"))
            })
            .collect();

        // Dated names sort chronologically
        logs.sort();

        while logs.len() > self.max_log_files {
            let oldest = logs.remove(0);
            tracing::debug!(path = %oldest.display(), "removing old log file");
            std::fs::remove_file(oldest)?;
        }
        Ok(())
    }
}
