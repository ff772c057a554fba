//! Store configuration.
//!
//! The owner id is fixed per deployment; it is never user input.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_USER_ID: u64 = 2148;
pub const DEFAULT_ERROR_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub user_id: u64,
    /// How long an error notice stays up before it clears itself.
    pub error_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID,
            error_timeout: DEFAULT_ERROR_TIMEOUT,
        }
    }
}

impl StoreConfig {
    pub fn new(base_url: &str, user_id: u64) -> Self {
        Self {
            base_url: base_url.to_string(),
            user_id,
            ..Self::default()
        }
    }

    /// Read `TODO_API_URL`, `TODO_USER_ID` and `TODO_ERROR_TIMEOUT_MS`,
    /// keeping defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("TODO_API_URL") {
            config.base_url = url;
        }
        if let Some(raw) = lookup("TODO_USER_ID") {
            config.user_id = parse_u64("TODO_USER_ID", "user id", raw)?;
        }
        if let Some(raw) = lookup("TODO_ERROR_TIMEOUT_MS") {
            let millis = parse_u64("TODO_ERROR_TIMEOUT_MS", "millisecond count", raw)?;
            config.error_timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }
}

fn parse_u64(var: &'static str, expected: &'static str, raw: String) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value: raw,
    })
}
