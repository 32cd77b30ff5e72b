//! Client configuration.
//!
//! One `base_url` carries any prefix the backend needs (`/api` by default);
//! endpoint paths are always relative to it. The configuration is fixed once
//! the client is built.

use std::time::Duration;

use thiserror::Error;

/// Base URL used by both profiles.
pub const DEFAULT_BASE_URL: &str = "/api";

/// Applied to every call; not overridable per call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

pub const ENV_PROFILE: &str = "NETTOOLS_PROFILE";
pub const ENV_BASE_URL: &str = "NETTOOLS_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "NETTOOLS_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown profile {0:?}, expected \"development\" or \"production\"")]
    UnknownProfile(String),

    #[error("invalid timeout {0:?}, expected a positive number of milliseconds")]
    InvalidTimeout(String),
}

/// Deployment profile. Both currently resolve to the same settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            _ => Err(ConfigError::UnknownProfile(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Development => Self::new(DEFAULT_BASE_URL),
            Profile::Production => Self::new(DEFAULT_BASE_URL),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from `NETTOOLS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let profile = match lookup(ENV_PROFILE) {
            Some(value) => Profile::parse(&value)?,
            None => Profile::default(),
        };
        let mut config = Self::for_profile(profile);
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout = parse_timeout_ms(&raw)?;
        }
        Ok(config)
    }
}

pub fn parse_timeout_ms(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
