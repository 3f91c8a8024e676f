//! Process configuration.
//!
//! Built once at startup and shared read-only. Values come from the
//! environment (a `.env` file is honored); everything has a default, and a
//! missing or empty API key means offline/demo mode.

use std::path::PathBuf;
use std::time::Duration;

use crate::llms::providers::gemini::DEFAULT_GEMINI_MODEL;
use crate::retry::RetrySettings;
use crate::utilities::errors::ConfigurationError;

/// Credential for the text-generation service.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Model identifier override.
pub const ENV_MODEL: &str = "TALKSENSE_MODEL";
/// Path to a YAML persona file.
pub const ENV_PERSONAS: &str = "TALKSENSE_PERSONAS";
/// Total attempts per persona call.
pub const ENV_MAX_RETRIES: &str = "TALKSENSE_MAX_RETRIES";
/// First backoff delay in milliseconds; doubles per retry.
pub const ENV_BACKOFF_BASE_MS: &str = "TALKSENSE_BACKOFF_BASE_MS";
/// Delay between persona calls in milliseconds.
pub const ENV_PACING_MS: &str = "TALKSENSE_PACING_MS";

/// Default delay between successive persona calls.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key; `None` selects offline/demo mode.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Persona definitions file; `None` uses the embedded personas.
    pub personas_file: Option<PathBuf>,
    /// Retry and backoff parameters.
    pub retry: RetrySettings,
    /// Wait between successive persona calls (online mode only).
    pub pacing: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            personas_file: None,
            retry: RetrySettings::default(),
            pacing: DEFAULT_PACING,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut retry = defaults.retry;
        if let Some(value) = non_empty(ENV_MAX_RETRIES) {
            retry.max_attempts = parse_setting(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = non_empty(ENV_BACKOFF_BASE_MS) {
            retry.backoff_base = Duration::from_millis(parse_setting(ENV_BACKOFF_BASE_MS, &value)?);
        }
        let pacing = match non_empty(ENV_PACING_MS) {
            Some(value) => Duration::from_millis(parse_setting(ENV_PACING_MS, &value)?),
            None => defaults.pacing,
        };

        Ok(Self {
            api_key: non_empty(ENV_API_KEY).map(|k| k.trim().to_string()),
            model: non_empty(ENV_MODEL).unwrap_or(defaults.model),
            personas_file: non_empty(ENV_PERSONAS).map(PathBuf::from),
            retry,
            pacing,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Whether no credential is configured.
    pub fn is_offline(&self) -> bool {
        self.api_key.is_none()
    }
}

fn parse_setting<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidSetting {
            name: name.to_string(),
            value: value.to_string(),
        })
}
