//! Configuration for the dispatcher and the SMS provider.
//!
//! Loaded from TOML. Every section and field has a default, so an empty file
//! (or no file) gives a working dry-run setup.
//!
//! ```toml
//! [dispatcher]
//! tick_interval_ms = 1000
//! staleness_window_secs = 60
//! send_timeout_secs = 10
//! debug_logs = false
//! utc_offset_minutes = 0
//!
//! [sms]
//! endpoint = "https://textbelt.com/text"
//! test_mode = false
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable consulted when `sms.api_key` is not set.
pub const SMS_API_KEY_ENV: &str = "SMS_API_KEY";

/// Textbelt's free key: one message per day, useful for smoke tests.
pub const TEXTBELT_TEST_KEY: &str = "textbelt";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChimeConfig {
    /// Polling loop settings.
    pub dispatcher: DispatcherConfig,
    /// SMS provider settings.
    pub sms: SmsConfig,
}

impl ChimeConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dispatcher.validate()
    }
}

/// Polling loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Time between tick starts, in milliseconds.
    pub tick_interval_ms: u64,
    /// How long after its scheduled time a goal is still delivered.
    pub staleness_window_secs: u64,
    /// Upper bound on one send call; a timeout marks the goal failed.
    pub send_timeout_secs: u64,
    /// Log claims and skips at info instead of debug.
    pub debug_logs: bool,
    /// Offset used for weekday and time-of-day arithmetic on recurring goals.
    pub utc_offset_minutes: i32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            staleness_window_secs: 60,
            send_timeout_secs: 10,
            debug_logs: false,
            utc_offset_minutes: 0,
        }
    }
}

impl DispatcherConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn staleness_window(&self) -> Result<chrono::Duration, ConfigError> {
        i64::try_from(self.staleness_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "staleness_window_secs is out of range: {}",
                    self.staleness_window_secs
                ))
            })
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "utc_offset_minutes must be within +/-1439, got {}",
                self.utc_offset_minutes
            ))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.send_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "send_timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.staleness_window()?;
        self.utc_offset()?;
        Ok(())
    }
}

/// SMS provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Textbelt-compatible endpoint.
    pub endpoint: String,
    /// API key. Falls back to `SMS_API_KEY` when unset.
    pub api_key: Option<String>,
    /// Use the provider's free test key instead of a real one.
    pub test_mode: bool,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://textbelt.com/text".to_owned(),
            api_key: None,
            test_mode: false,
        }
    }
}

impl SmsConfig {
    /// Key to send with each request.
    pub fn resolved_api_key(&self) -> String {
        if self.test_mode {
            return TEXTBELT_TEST_KEY.to_owned();
        }
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(SMS_API_KEY_ENV).ok())
            .unwrap_or_default()
    }
}
