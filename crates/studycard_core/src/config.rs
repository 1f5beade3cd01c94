//! Process configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve provider, storage and logging settings once at startup.
//! - Keep the provider credential out of logs and debug output.
//!
//! # Invariants
//! - A missing or blank credential is not an error; it selects placeholder
//!   answers.
//! - Unparseable numeric values are rejected instead of silently defaulted.

use crate::logging::default_log_level;
use crate::repo::card_store::DEFAULT_DATA_FILE;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_KEY: &str = "ARK_API_KEY";
pub const ENV_BASE_URL: &str = "STUDYCARD_BASE_URL";
pub const ENV_MODEL: &str = "STUDYCARD_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "STUDYCARD_TIMEOUT_SECS";
pub const ENV_DATA_FILE: &str = "STUDYCARD_DATA_FILE";
pub const ENV_CACHE_SECS: &str = "STUDYCARD_CACHE_SECS";
pub const ENV_LOG_LEVEL: &str = "STUDYCARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STUDYCARD_LOG_DIR";

pub const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
pub const DEFAULT_MODEL: &str = "doubao-seed-1-6-250615";
pub const DEFAULT_CACHE_SECS: u64 = 5;

/// Provider credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw secret, for the Authorization header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Chat-completion provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: Option<ApiKey>,
    /// Base URL without trailing slash.
    pub base_url: String,
    pub model: String,
    /// `None` leaves request duration unbounded.
    pub timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub data_file: PathBuf,
    /// Zero disables the view cache.
    pub cache_ttl: Duration,
    pub log_level: String,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_SECS),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { name, value } => {
                write!(f, "{name} must be a non-negative integer, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

impl AppConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let provider = ProviderConfig {
            api_key: lookup(ENV_API_KEY).and_then(ApiKey::new),
            base_url: get(ENV_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.provider.base_url),
            model: get(ENV_MODEL).unwrap_or(defaults.provider.model),
            timeout: parse_secs(ENV_TIMEOUT_SECS, get(ENV_TIMEOUT_SECS))?
                .filter(|timeout| !timeout.is_zero()),
        };

        Ok(Self {
            provider,
            data_file: get(ENV_DATA_FILE)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            cache_ttl: parse_secs(ENV_CACHE_SECS, get(ENV_CACHE_SECS))?
                .unwrap_or(defaults.cache_ttl),
            log_level: get(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

fn parse_secs(name: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|text| {
            text.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber { name, value: text })
        })
        .transpose()
}
