//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QKART_BACKEND_URL` - Base URL of the REST backend (e.g. `http://localhost:8082/api/v1`)
//!
//! ## Optional
//! - `QKART_SEARCH_DEBOUNCE_MS` - Quiet period before a search is sent (default: 500)
//! - `QKART_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Fraction of error events sent to Sentry (default: 1.0)

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SEARCH_DEBOUNCE_MS: &str = "500";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";
const DEFAULT_SENTRY_SAMPLE_RATE: &str = "1.0";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST backend connection settings
    pub backend: BackendConfig,
    /// Quiet period before a debounced search fires
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
    /// Fraction of error events reported to Sentry
    pub sentry_sample_rate: f32,
}

/// REST backend connection settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;
        let search_debounce = Duration::from_millis(parse_env(
            "QKART_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_env("SENTRY_SAMPLE_RATE", DEFAULT_SENTRY_SAMPLE_RATE)?;
        validate_sample_rate(sentry_sample_rate, "SENTRY_SAMPLE_RATE")?;

        Ok(Self {
            backend,
            search_debounce,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Configuration pointing at `base_url` with default timings and no Sentry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn for_backend(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            backend: BackendConfig {
                base_url: parse_base_url(base_url, "base_url")?,
                request_timeout: Duration::from_secs(30),
            },
            search_debounce: Duration::from_millis(500),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("QKART_BACKEND_URL")?;
        Ok(Self {
            base_url: parse_base_url(&raw, "QKART_BACKEND_URL")?,
            request_timeout: Duration::from_secs(parse_env(
                "QKART_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse and normalize the backend base URL.
///
/// A trailing slash is enforced so that `Url::join` appends endpoint paths
/// instead of replacing the last segment.
fn parse_base_url(raw: &str, var_name: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn validate_sample_rate(rate: f32, var_name: &str) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_appends_trailing_slash() {
        let url = parse_base_url("http://localhost:8082/api/v1", "TEST").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8082/api/v1/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "http://localhost:8082/api/v1/products"
        );
    }

    #[test]
    fn test_parse_base_url_keeps_existing_slash() {
        let url = parse_base_url("https://qkart.example.com/api/v1/", "TEST").unwrap();
        assert_eq!(url.as_str(), "https://qkart.example.com/api/v1/");
    }

    #[test]
    fn test_parse_base_url_root() {
        let url = parse_base_url("http://127.0.0.1:9000", "TEST").unwrap();
        assert_eq!(url.join("cart").unwrap().as_str(), "http://127.0.0.1:9000/cart");
    }

    #[test]
    fn test_parse_base_url_rejects_scheme() {
        let err = parse_base_url("ftp://example.com", "TEST").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("not a url", "TEST").is_err());
    }

    #[test]
    fn test_validate_sample_rate() {
        assert!(validate_sample_rate(0.0, "TEST").is_ok());
        assert!(validate_sample_rate(1.0, "TEST").is_ok());
        assert!(validate_sample_rate(1.5, "TEST").is_err());
    }

    #[test]
    fn test_for_backend_defaults() {
        let config = StorefrontConfig::for_backend("http://localhost:8082/api/v1").unwrap();
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.backend.request_timeout, Duration::from_secs(30));
        assert!(config.sentry_dsn.is_none());
    }
}
