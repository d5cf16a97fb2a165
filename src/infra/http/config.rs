//! Connection settings for the user service.

use std::time::Duration;

use validator::Validate;

use crate::domain::ConfigError;

pub const INTERNAL_URL_ENV: &str = "USER_SERVICE_INTERNAL_URL";
pub const EXTERNAL_URL_ENV: &str = "USER_SERVICE_EXTERNAL_URL";
pub const TIMEOUT_SECS_ENV: &str = "USER_SERVICE_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URLs and timeout for the user service.
///
/// A zero `timeout` means no client-level timeout.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ClientConfig {
    #[validate(url)]
    pub internal_base_url: String,
    #[validate(url)]
    pub external_base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            internal_base_url: String::new(),
            external_base_url: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(internal_base_url: impl Into<String>, external_base_url: impl Into<String>) -> Self {
        Self {
            internal_base_url: internal_base_url.into(),
            external_base_url: external_base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load and validate the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required variable is missing, the timeout
    /// is not a non-negative integer, or a base URL is not an absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let internal = required(INTERNAL_URL_ENV)?;
        let external = required(EXTERNAL_URL_ENV)?;

        let timeout = match lookup(TIMEOUT_SECS_ENV) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: TIMEOUT_SECS_ENV.to_string(),
                        message: e.to_string(),
                    })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let config = Self::new(internal, external).with_timeout(timeout);
        config.validate()?;
        Ok(config)
    }
}
