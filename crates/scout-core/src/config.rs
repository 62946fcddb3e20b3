//! Configuration types.
//!
//! Configuration lives in `config.toml` under the platform config directory.
//! A missing file means defaults; every field is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::tender::URGENT_WINDOW_DAYS;

/// Page size the remote source is queried with. Not configurable: page
/// counts are always `ceil(total / 20)`.
pub const PAGE_SIZE: u32 = 20;

/// Longest urgency window accepted from configuration, in days.
pub const MAX_URGENT_WINDOW_DAYS: i64 = 3650;

/// Storage key the saved tender set lives under.
pub const SAVED_TENDERS_KEY: &str = "savedTenders";

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Days ahead a closing date counts as urgent.
    pub urgent_window_days: i64,

    /// Deadline for a single query against the source.
    pub request_timeout_ms: u64,

    /// Key the saved tender set is persisted under.
    pub saved_storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            urgent_window_days: URGENT_WINDOW_DAYS,
            request_timeout_ms: 10_000,
            saved_storage_key: SAVED_TENDERS_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The urgency window. Out-of-range values fall back to the default
    /// window; `from_toml` rejects them anyway.
    pub fn urgent_window(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.urgent_window_days).unwrap_or_else(crate::urgent_window)
    }

    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_URGENT_WINDOW_DAYS).contains(&self.urgent_window_days) {
            return Err(ConfigError::Invalid {
                field: "urgent_window_days",
                message: format!("must be between 0 and {}", MAX_URGENT_WINDOW_DAYS),
            });
        }
        if self.saved_storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "saved_storage_key",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("scout"))
}

/// Get the path to config.toml.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Get the directory durable client state is written to.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("scout"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.urgent_window_days, 7);
        assert_eq!(config.saved_storage_key, "savedTenders");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml("request_timeout_ms = 500").unwrap();
        assert_eq!(config.request_timeout_ms, 500);
        assert_eq!(config.urgent_window_days, 7);
    }

    #[test]
    fn test_rejects_out_of_range_urgent_window() {
        for text in ["urgent_window_days = -1", "urgent_window_days = 9000000000000000"] {
            let err = EngineConfig::from_toml(text).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    field: "urgent_window_days",
                    ..
                }
            ));
        }
        assert!(EngineConfig::from_toml("urgent_window_days = 3650").is_ok());
    }

    #[test]
    fn test_unvalidated_urgent_window_does_not_panic() {
        let config = EngineConfig {
            urgent_window_days: i64::MAX,
            ..EngineConfig::default()
        };
        assert_eq!(config.urgent_window(), chrono::Duration::days(7));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = EngineConfig::from_toml("urgent_window_days = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_ms = 250\nurgent_window_days = 3\n").unwrap();

        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.urgent_window(), chrono::Duration::days(3));
    }
}
