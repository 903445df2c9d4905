//! Service configuration, stored in `~/.taskboard/config.json`.
//!
//! The daily capacity drives the roadmap scheduler and is threaded into it as
//! an explicit parameter; nothing in the core reads this globally.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `daily_capacity_hours`.
pub const DAILY_CAPACITY_ENV: &str = "TASKBOARD_DAILY_CAPACITY_HOURS";

/// Fallback daily capacity when nothing is configured.
pub const DEFAULT_DAILY_CAPACITY_HOURS: f64 = 8.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found")]
    NotFound,
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("daily_capacity_hours must be a positive number, got {0}")]
    InvalidCapacity(f64),
    #[error("Invalid {DAILY_CAPACITY_ENV} value: {0}")]
    InvalidEnv(String),
}

/// Main service configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceConfig {
    /// Scheduler budget: cumulative estimated hours allowed per day.
    #[serde(default = "default_capacity")]
    pub daily_capacity_hours: f64,
    /// SQLite database URL; `None` means the backend's default location.
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_capacity() -> f64 {
    DEFAULT_DAILY_CAPACITY_HOURS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            daily_capacity_hours: DEFAULT_DAILY_CAPACITY_HOURS,
            database_url: None,
        }
    }
}

impl ServiceConfig {
    /// Load config from the default path, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::load_from(Self::default_path()) {
            Ok(config) => config,
            Err(ConfigError::NotFound) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a custom path (no environment overrides).
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound
            } else {
                ConfigError::Read(e)
            }
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a custom path, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self)?)?;
        Ok(())
    }

    /// Default config path (`~/.taskboard/config.json`).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".taskboard")
            .join("config.json")
    }

    /// Overlay environment variables onto this config.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(DAILY_CAPACITY_ENV) {
            self.daily_capacity_hours = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv(raw))?;
        }
        Ok(())
    }

    /// A capacity that is zero, negative, or not finite degenerates the
    /// scheduler to one task per day; reject it up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.daily_capacity_hours.is_finite() || self.daily_capacity_hours <= 0.0 {
            return Err(ConfigError::InvalidCapacity(self.daily_capacity_hours));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = ServiceConfig {
            daily_capacity_hours: 6.5,
            database_url: Some("sqlite::memory:".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = ServiceConfig::load_from(&path).unwrap();
        assert_eq!(loaded.daily_capacity_hours, 6.5);
        assert_eq!(loaded.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = ServiceConfig::load_from(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound));
    }

    #[test]
    fn defaults_applied_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        let loaded = ServiceConfig::load_from(&path).unwrap();
        assert_eq!(loaded.daily_capacity_hours, DEFAULT_DAILY_CAPACITY_HOURS);
        assert!(loaded.database_url.is_none());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = ServiceConfig {
            daily_capacity_hours: 0.0,
            database_url: None,
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidCapacity(_)
        ));
    }

    #[test]
    fn negative_capacity_rejected_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"daily_capacity_hours": -2.0}"#).unwrap();
        assert!(matches!(
            ServiceConfig::load_from(&path).unwrap_err(),
            ConfigError::InvalidCapacity(_)
        ));
    }
}
