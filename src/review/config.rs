//! Scheduler configuration
//!
//! Loaded from TOML. Every key is optional; missing keys take the defaults
//! below.
//!
//! ```toml
//! [policy]
//! initialEase = 2.5
//! masteryRepetitions = 5
//! masteryIntervalDays = 21
//!
//! [store]
//! dataDir = "/var/lib/recall"
//! timeoutMs = 5000
//!
//! [session]
//! batchSize = 50
//! utcOffsetMinutes = 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::algorithm::SchedulePolicy;

/// Overrides `store.dataDir`
pub const DATA_DIR_ENV: &str = "RECALL_DATA_DIR";

const MINUTES_PER_DAY: i32 = 24 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level scheduler configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    pub policy: SchedulePolicy,
    pub store: StoreConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Where the file store keeps its items (default: platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Upper bound on any single store call
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Maximum items per due batch, 0 for no limit
    pub batch_size: usize,
    /// Offset from UTC of the day boundary used for scheduling
    pub utc_offset_minutes: i32,
}

impl SchedulerConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("recall").join("config.toml"))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist. A missing default file yields the
    /// defaults. Environment overrides are applied and the result validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    log::debug!("No config at {:?}, using defaults", default_path);
                    Self::default()
                }
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.store.data_dir = Some(PathBuf::from(dir));
            }
        }
    }

    /// Reject settings the scheduler cannot honour
    pub fn validate(&self) -> Result<()> {
        let p = &self.policy;
        let finite = [
            p.initial_ease,
            p.min_ease,
            p.max_ease,
            p.fail_ease_penalty,
            p.hard_ease_penalty,
            p.easy_ease_bonus,
            p.hard_multiplier,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return invalid("policy values must be finite numbers");
        }
        if p.min_ease < 1.0 {
            return invalid(format!("minEase {} is below 1.0", p.min_ease));
        }
        if p.min_ease > p.max_ease {
            return invalid(format!(
                "minEase {} is greater than maxEase {}",
                p.min_ease, p.max_ease
            ));
        }
        if p.initial_ease < p.min_ease || p.initial_ease > p.max_ease {
            return invalid(format!(
                "initialEase {} is outside [{}, {}]",
                p.initial_ease, p.min_ease, p.max_ease
            ));
        }
        if p.fail_ease_penalty < 0.0 || p.hard_ease_penalty < 0.0 || p.easy_ease_bonus < 0.0 {
            return invalid("ease adjustments must not be negative");
        }
        if p.hard_multiplier < 1.0 {
            return invalid(format!("hardMultiplier {} is below 1.0", p.hard_multiplier));
        }
        if p.max_interval_days == 0 {
            return invalid("maxIntervalDays must be at least 1");
        }
        if self.store.timeout_ms == 0 {
            return invalid("store.timeoutMs must be greater than 0");
        }
        if self.session.utc_offset_minutes.abs() >= MINUTES_PER_DAY {
            return invalid(format!(
                "session.utcOffsetMinutes {} must be within one day",
                self.session.utc_offset_minutes
            ));
        }
        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store.timeout_ms)
    }

    /// Offset of the scheduling day boundary
    pub fn day_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.session.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Calendar day `now` falls on for scheduling purposes
    pub fn scheduling_day(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.day_offset()).date_naive()
    }
}

fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(ConfigError::Invalid(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = SchedulerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.policy.min_ease, 1.3);
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
        assert_eq!(config.session.batch_size, 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SchedulerConfig::from_toml_str(
            r#"
            [policy]
            masteryRepetitions = 3

            [session]
            batchSize = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.policy.mastery_repetitions, 3);
        assert_eq!(config.policy.mastery_interval_days, 21);
        assert_eq!(config.session.batch_size, 20);
        assert_eq!(config.store.timeout_ms, 5_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SchedulerConfig::default();
        config.store.data_dir = Some(PathBuf::from("/tmp/recall"));
        config.session.utc_offset_minutes = -300;

        let text = config.to_toml_string().unwrap();
        assert!(text.contains("utcOffsetMinutes = -300"));
        assert_eq!(SchedulerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_validation_rejects_bad_policy() {
        let mut config = SchedulerConfig::default();
        config.policy.min_ease = 3.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SchedulerConfig::default();
        config.policy.hard_multiplier = 0.9;
        assert!(config.validate().is_err());

        let mut config = SchedulerConfig::default();
        config.policy.initial_ease = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SchedulerConfig::default();
        config.store.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SchedulerConfig::default();
        config.session.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let err = SchedulerConfig::load(Some(temp.path().join("nope.toml").as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[store]\ntimeoutMs = 250\n").unwrap();

        let config = SchedulerConfig::from_file(&path).unwrap();
        assert_eq!(config.store_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_scheduling_day_respects_offset() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let utc = SchedulerConfig::default();
        assert_eq!(utc.scheduling_day(now), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let mut east = SchedulerConfig::default();
        east.session.utc_offset_minutes = 60;
        assert_eq!(east.scheduling_day(now), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
