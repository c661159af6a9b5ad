//! Tankwatch Configuration
//!
//! Operator-tunable values loaded from TOML, with built-in defaults that
//! match the engine's hardcoded constants so behavior is unchanged when no
//! config file is present.
//!
//! ## Loading Order
//!
//! 1. `TANKWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `tankwatch.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The engine itself stays pure: configuration is passed explicitly into
//! the service and orchestrator, never read from a global.

use crate::types::DEFAULT_REFILL_JUMP_THRESHOLD_PERCENT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default analysis window requested from the reading source (days).
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Default worker pool size for batch recalculation. Sized to a typical
/// hosted-store connection budget, not to CPU count.
pub const DEFAULT_MAX_CONCURRENT_TANKS: usize = 4;

/// Default interval between scheduled batch runs (seconds).
pub const DEFAULT_RECALC_INTERVAL_SECS: u64 = 3600;

/// Environment variable naming the config file path.
pub const CONFIG_PATH_ENV: &str = "TANKWATCH_CONFIG";

/// Default config file name searched in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tankwatch.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TankwatchConfig {
    /// Single-tank forecast tuning
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Batch recalculation tuning
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Forecast pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// History window requested from the reading source (days)
    pub window_days: u32,
    /// Fleet-wide default refill jump threshold (percentage points).
    /// Individual tank contexts may carry their own.
    pub refill_jump_threshold_percent: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            refill_jump_threshold_percent: DEFAULT_REFILL_JUMP_THRESHOLD_PERCENT,
        }
    }
}

/// Batch orchestration tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Bounded worker pool size for per-tank recalculation
    pub max_concurrent_tanks: usize,
    /// Interval between scheduled batch runs (seconds)
    pub interval_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tanks: DEFAULT_MAX_CONCURRENT_TANKS,
            interval_secs: DEFAULT_RECALC_INTERVAL_SECS,
        }
    }
}

impl TankwatchConfig {
    /// Load configuration following the documented search order, falling
    /// back to defaults when no file is found. A file that exists but does
    /// not parse or validate is reported and *ignored* — a bad config file
    /// should not silently change forecasting behavior.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            match Self::from_file(Path::new(&path)) {
                Ok(config) => {
                    info!(path = %path, "config loaded from {CONFIG_PATH_ENV}");
                    return config;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "ignoring unusable config from {CONFIG_PATH_ENV}");
                }
            }
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            match Self::from_file(default_path) {
                Ok(config) => {
                    info!(path = %default_path.display(), "config loaded");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "ignoring unusable {DEFAULT_CONFIG_FILE}");
                }
            }
        }

        debug!("no config file found, using built-in defaults");
        Self::default()
    }

    /// Parse and validate a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot meaningfully run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forecast.window_days == 0 {
            return Err(ConfigError::Invalid(
                "forecast.window_days must be at least 1".to_string(),
            ));
        }
        if !self.forecast.refill_jump_threshold_percent.is_finite()
            || self.forecast.refill_jump_threshold_percent <= 0.0
        {
            return Err(ConfigError::Invalid(format!(
                "forecast.refill_jump_threshold_percent must be positive, got {}",
                self.forecast.refill_jump_threshold_percent
            )));
        }
        if self.batch.max_concurrent_tanks == 0 {
            return Err(ConfigError::Invalid(
                "batch.max_concurrent_tanks must be at least 1".to_string(),
            ));
        }
        if self.batch.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "batch.interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = TankwatchConfig::default();
        assert_eq!(config.forecast.window_days, 7);
        assert!((config.forecast.refill_jump_threshold_percent - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.batch.max_concurrent_tanks, 4);
        assert_eq!(config.batch.interval_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TankwatchConfig = toml::from_str(
            r#"
            [forecast]
            window_days = 14
            "#,
        )
        .unwrap();
        assert_eq!(config.forecast.window_days, 14);
        assert!((config.forecast.refill_jump_threshold_percent - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.batch.max_concurrent_tanks, 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config: TankwatchConfig = toml::from_str(
            r#"
            [forecast]
            window_days = 0
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config: TankwatchConfig = toml::from_str(
            r#"
            [batch]
            max_concurrent_tanks = 0
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[forecast]\nwindow_days = 30\nrefill_jump_threshold_percent = 15.0\n\n[batch]\nmax_concurrent_tanks = 8\n"
        )
        .unwrap();

        let config = TankwatchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.forecast.window_days, 30);
        assert!((config.forecast.refill_jump_threshold_percent - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.batch.max_concurrent_tanks, 8);
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = TankwatchConfig::from_file(Path::new("/nonexistent/tankwatch.toml"));
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }
}
