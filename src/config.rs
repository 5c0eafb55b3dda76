//! Configuration for the MotionLogger-to-Condor converter.

use crate::core::OutputMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted defaults applied when the command line leaves them unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Epoch length used when `--epoch` is not given
    pub default_epoch_seconds: u32,

    /// Output mode used when `--mode` is not given
    pub default_mode: OutputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_epoch_seconds: 60,
            default_mode: OutputMode::Reconstruct,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("motionlog-condor")
            .join("config.json")
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_epoch_seconds, 60);
        assert_eq!(config.default_mode, OutputMode::Reconstruct);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config {
            default_epoch_seconds: 30,
            default_mode: OutputMode::Preserve,
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.default_epoch_seconds, 30);
        assert_eq!(restored.default_mode, OutputMode::Preserve);
    }
}
