//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPFRONT_API_URL` - Root URL of the commerce backend
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `API_CACHE_TTL_SECS` - Catalog cache lifetime, 0 disables (default: 300)
//! - `THEME_PATH` - Theme JSON shared with the admin (default: theme.json)
//! - `PRODUCTS_PER_PAGE` - Listing page size (default: 12)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal for free shipping (default: 50.00)
//! - `FLAT_SHIPPING_RATE` - Shipping below the threshold (default: 5.99)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of requests traced (default: 0.1)

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use shopfront_api::ApiClientConfig;
use shopfront_core::ShippingPolicy;
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Commerce backend client settings
    pub api: ApiClientConfig,
    /// Theme file written by the admin
    pub theme_path: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    pub products_per_page: usize,
    pub shipping: ShippingPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_traces_sample_rate: f32,
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

        let host = get_parsed_env::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_env::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_url("STOREFRONT_BASE_URL")?.to_string();

        let mut api = ApiClientConfig::new(get_required_url("SHOPFRONT_API_URL")?);
        api.timeout = Duration::from_secs(get_parsed_env("API_TIMEOUT_SECS", "10")?);
        api.cache_ttl = Duration::from_secs(get_parsed_env("API_CACHE_TTL_SECS", "300")?);

        let shipping = ShippingPolicy {
            free_threshold: get_parsed_env::<Decimal>("FREE_SHIPPING_THRESHOLD", "50.00")?,
            flat_rate: get_parsed_env::<Decimal>("FLAT_SHIPPING_RATE", "5.99")?,
        };

        let products_per_page = get_parsed_env::<usize>("PRODUCTS_PER_PAGE", "12")?;
        if products_per_page == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PRODUCTS_PER_PAGE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            api,
            theme_path: PathBuf::from(get_env_or_default("THEME_PATH", "theme.json")),
            static_dir: PathBuf::from(get_env_or_default(
                "STOREFRONT_STATIC_DIR",
                "crates/storefront/static",
            )),
            products_per_page,
            shipping,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
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

/// Get a required environment variable holding an absolute http(s) URL.
fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    parse_http_url(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
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

fn parse_http_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("http://localhost:4000/api").is_ok());
        assert!(parse_http_url(" https://shop.example.com ").is_ok());
        assert!(parse_http_url("ftp://example.com").is_err());
        assert!(parse_http_url("not a url").is_err());
    }

    #[test]
    fn test_get_parsed_env_default_and_invalid() {
        let value: u16 = get_parsed_env("SHOPFRONT_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(value, 3000);

        let err = get_parsed_env::<u16>("SHOPFRONT_TEST_UNSET_PORT", "99999").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SHOPFRONT_TEST_UNSET_PORT"));
    }

    #[test]
    fn test_decimal_defaults_parse() {
        let rate: Decimal = get_parsed_env("SHOPFRONT_TEST_UNSET_RATE", "5.99").unwrap();
        assert_eq!(rate, Decimal::new(599, 2));
    }

    #[test]
    fn test_missing_required() {
        let err = get_required_env("SHOPFRONT_TEST_DEFINITELY_UNSET").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: SHOPFRONT_TEST_DEFINITELY_UNSET"
        );
    }
}
