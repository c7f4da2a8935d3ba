//! Detector configuration.
//!
//! Values come from defaults, then `VERISCAN_*` environment variables, then
//! whatever the CLI overrides on top.

use std::time::Duration;
use thiserror::Error;

use crate::input::DEFAULT_MAX_INLINE_BYTES;
use crate::llm::providers::gemini::{DEFAULT_MODEL, REQUEST_TIMEOUT_SECS};

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Settings for a [`Detector`](super::Detector) run.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature for the analysis call.
    pub temperature: f64,
    /// Largest image or video accepted for inline upload, in bytes.
    pub max_inline_bytes: usize,
    /// HTTP timeout for a single model request.
    pub request_timeout: Duration,
    /// Let URL analysis use web search (and report grounding sources).
    pub enable_url_search: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_inline_bytes: DEFAULT_MAX_INLINE_BYTES,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            enable_url_search: true,
        }
    }
}

impl DetectorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VERISCAN_MODEL`: Model identifier (default: gemini-2.5-flash)
    /// - `VERISCAN_TEMPERATURE`: Sampling temperature (default: 0.2)
    /// - `VERISCAN_MAX_INLINE_BYTES`: Media size limit (default: 20 MiB)
    /// - `VERISCAN_TIMEOUT_SECS`: Request timeout in seconds (default: 120)
    /// - `VERISCAN_URL_SEARCH`: Web search for URL analysis (default: true)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("VERISCAN_MODEL") {
            config.model = val;
        }

        if let Some(val) = lookup("VERISCAN_TEMPERATURE") {
            config.temperature = parse_env_value(&val, "VERISCAN_TEMPERATURE")?;
        }

        if let Some(val) = lookup("VERISCAN_MAX_INLINE_BYTES") {
            config.max_inline_bytes = parse_env_value(&val, "VERISCAN_MAX_INLINE_BYTES")?;
        }

        if let Some(val) = lookup("VERISCAN_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "VERISCAN_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(val) = lookup("VERISCAN_URL_SEARCH") {
            config.enable_url_search = parse_env_bool(&val, "VERISCAN_URL_SEARCH")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.max_inline_bytes == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_inline_bytes must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_inline_bytes(mut self, max_inline_bytes: usize) -> Self {
        self.max_inline_bytes = max_inline_bytes;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_url_search(mut self, enabled: bool) -> Self {
        self.enable_url_search = enabled;
        self
    }
}

/// Parse an environment variable value.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

/// Parse an environment variable as a boolean.
fn parse_env_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean value, got '{}'", value),
        }),
    }
}
