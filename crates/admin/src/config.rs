//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin panel
//! - `SHOPFRONT_API_URL` - Root URL of the commerce backend
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_STATIC_DIR` - Static asset directory (default: crates/admin/static)
//! - `API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `THEME_PATH` - Theme JSON shared with the storefront (default: theme.json)
//! - `ADMIN_PAGE_SIZE` - Rows per list page (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of requests traced (default: 0.1)

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shopfront_api::ApiClientConfig;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Commerce backend client settings. Reads are never cached so every
    /// page shows what the backend holds right now.
    pub api: ApiClientConfig,
    /// Theme file read by the storefront
    pub theme_path: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Rows per list page
    pub page_size: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
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

        let mut api = ApiClientConfig::new(get_required_url("SHOPFRONT_API_URL")?);
        api.timeout = Duration::from_secs(get_parsed_env("API_TIMEOUT_SECS", "10")?);
        api.cache_ttl = Duration::ZERO;

        let page_size = get_parsed_env::<usize>("ADMIN_PAGE_SIZE", "20")?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: get_parsed_env("ADMIN_HOST", "127.0.0.1")?,
            port: get_parsed_env("ADMIN_PORT", "3001")?,
            base_url: get_required_url("ADMIN_BASE_URL")?.to_string(),
            api,
            theme_path: PathBuf::from(get_env_or_default("THEME_PATH", "theme.json")),
            static_dir: PathBuf::from(get_env_or_default(
                "ADMIN_STATIC_DIR",
                "crates/admin/static",
            )),
            page_size,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: get_parsed_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_parsed_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(err.to_string(), "Missing environment variable: TEST_VAR");

        let err = ConfigError::InvalidEnvVar("TEST_VAR".to_string(), "bad value".to_string());
        assert_eq!(err.to_string(), "Invalid environment variable TEST_VAR: bad value");
    }

    #[test]
    fn test_parsed_defaults() {
        let size: usize = get_parsed_env("SHOPFRONT_ADMIN_TEST_UNSET_SIZE", "20").unwrap();
        assert_eq!(size, 20);
        let rate: f32 = get_parsed_env("SHOPFRONT_ADMIN_TEST_UNSET_RATE", "1.0").unwrap();
        assert!((rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_required_url_missing() {
        let err = get_required_url("SHOPFRONT_ADMIN_TEST_UNSET_URL").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }
}
