//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_HOST` - Bind address (default: 127.0.0.1)
//! - `CART_PORT` - Listen port (default: 3000)
//! - `CART_FIELDS_BASIC` - Field list for the `BASIC` level
//! - `CART_FIELDS_DEFAULT` - Field list for the `DEFAULT` level
//! - `CART_FIELDS_FULL` - Field list for the `FULL` level
//! - `CART_STOCK_FIXTURE` - Path to a JSON stock fixture for the in-memory platform
//! - `LOG_FORMAT` - `json` for JSON log lines, anything else for human readable
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: development)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::fields::{
    DEFAULT_BASIC_FIELDS, DEFAULT_DEFAULT_FIELDS, DEFAULT_FULL_FIELDS, FieldSets,
};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sentry settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SentryConfig {
    /// DSN; Sentry is disabled when absent
    pub dsn: Option<String>,
    /// Environment tag
    pub environment: String,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance trace sample rate
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: "development".to_string(),
            sample_rate: 1.0,
            traces_sample_rate: 0.1,
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Response field levels
    pub field_sets: FieldSets,
    /// Stock fixture served by the in-memory platform
    pub stock_fixture: Option<PathBuf>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry settings
    pub sentry: SentryConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            field_sets: FieldSets::builtin(),
            stock_fixture: None,
            log_format: LogFormat::default(),
            sentry: SentryConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let host = env.parsed::<IpAddr>("CART_HOST", "127.0.0.1")?;
        let port = env.parsed::<u16>("CART_PORT", "3000")?;

        let field_sets = FieldSets::from_lists(
            &env.get_or_default("CART_FIELDS_BASIC", DEFAULT_BASIC_FIELDS),
            &env.get_or_default("CART_FIELDS_DEFAULT", DEFAULT_DEFAULT_FIELDS),
            &env.get_or_default("CART_FIELDS_FULL", DEFAULT_FULL_FIELDS),
        )
        .map_err(|e| ConfigError::InvalidEnvVar("CART_FIELDS_*".to_string(), e.to_string()))?;

        let log_format = match env.get_optional("LOG_FORMAT").as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let sentry = SentryConfig {
            dsn: env.get_optional("SENTRY_DSN"),
            environment: env.get_or_default("SENTRY_ENVIRONMENT", "development"),
            sample_rate: env.rate("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: env.rate("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        };

        Ok(Self {
            host,
            port,
            field_sets,
            stock_fixture: env.get_optional("CART_STOCK_FIXTURE").map(PathBuf::from),
            log_format,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Blank values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get a variable and parse it.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get a sample rate between 0.0 and 1.0.
    fn rate(&self, key: &str, default: &str) -> Result<f32, ConfigError> {
        let rate = self.parsed::<f32>(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ))
        }
    }
}
