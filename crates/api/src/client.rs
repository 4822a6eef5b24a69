//! HTTP plumbing shared by every endpoint.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::cache::{CacheKey, CacheValue};
use crate::error::ApiError;

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Backend root, e.g. `http://localhost:4000/api`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long catalog reads stay cached. Zero disables the cache.
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl ApiClientConfig {
    /// Defaults: 10s timeout, 5 minute cache of up to 1000 entries.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the commerce backend.
///
/// Cheap to clone; clones share the connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

/// A list endpoint may answer with a bare array or wrap it.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Items { items: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Data { data: items } | Self::Items { items } => items,
        }
    }
}

/// A single-record endpoint may answer with the record or `{"data": record}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemBody<T> {
    Data { data: T },
    Bare(T),
}

impl<T> ItemBody<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Data { data } | Self::Bare(data) => data,
        }
    }
}

impl ApiClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &ApiClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shopfront/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(config.cache_ttl)
                .build()
        });

        // Url::join drops the last path segment unless it ends with '/'.
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                cache,
            }),
        }
    }

    /// Backend root URL (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Absolute URL for a backend path such as `/products/3`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder, ApiError> {
        let builder = self.inner.client.request(method, self.url(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Send a request and return the raw status and body.
    ///
    /// Non-success statuses become [`ApiError`]s.
    pub(crate) async fn send_raw(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read the body first so it can be logged on failure
        let body = response.text().await?;

        if !status.is_success() {
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    path,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned server error"
                );
            } else {
                debug!(status = %status, path, "Backend rejected request");
            }
            return Err(ApiError::from_response(status, &body, path));
        }

        Ok(body)
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(request, path).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<Vec<T>, ApiError> {
        let request = self.request(Method::GET, path, token)?;
        let body: ListBody<T> = self.send_json(request, path).await?;
        Ok(body.into_vec())
    }

    pub(crate) async fn get_item<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path, token)?;
        let body: ItemBody<T> = self.send_json(request, path).await?;
        Ok(body.into_inner())
    }

    /// Send a JSON body and decode the record in the response.
    pub(crate) async fn send_item<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        payload: &B,
    ) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path, token)?.json(payload);
        let body: ItemBody<T> = self.send_json(request, path).await?;
        Ok(body.into_inner())
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<(), ApiError> {
        let request = self.request(method, path, token)?;
        self.send_raw(request, path).await.map(|_| ())
    }

    // =========================================================================
    // Cache
    // =========================================================================

    pub(crate) async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let value = self.inner.cache.as_ref()?.get(key).await;
        if value.is_some() {
            debug!(?key, "Cache hit");
        }
        value
    }

    pub(crate) async fn store(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    pub(crate) async fn invalidate(&self, keys: &[CacheKey]) {
        if let Some(cache) = &self.inner.cache {
            for key in keys {
                cache.invalidate(key).await;
            }
        }
    }

    /// Drop every cached catalog response.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiClientConfig::new(Url::parse(base).unwrap()))
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client("http://localhost:4000/api");
        assert_eq!(
            client.url("/products/3").unwrap().as_str(),
            "http://localhost:4000/api/products/3"
        );
        assert_eq!(
            client.url("users/admin/all").unwrap().as_str(),
            "http://localhost:4000/api/users/admin/all"
        );
    }

    #[test]
    fn test_url_with_bare_host() {
        let client = client("http://localhost:4000");
        assert_eq!(client.base_url().as_str(), "http://localhost:4000/");
        assert_eq!(
            client.url("/health").unwrap().as_str(),
            "http://localhost:4000/health"
        );
    }

    #[test]
    fn test_list_body_shapes() {
        let bare: ListBody<u8> = serde_json::from_str("[1,2]").unwrap();
        let data: ListBody<u8> = serde_json::from_str(r#"{"data":[1,2],"total":2}"#).unwrap();
        let items: ListBody<u8> = serde_json::from_str(r#"{"items":[1,2]}"#).unwrap();
        assert_eq!(bare.into_vec(), [1, 2]);
        assert_eq!(data.into_vec(), [1, 2]);
        assert_eq!(items.into_vec(), [1, 2]);
    }

    #[test]
    fn test_item_body_shapes() {
        let wrapped: ItemBody<serde_json::Value> =
            serde_json::from_str(r#"{"data":{"id":1}}"#).unwrap();
        assert_eq!(wrapped.into_inner()["id"], 1);

        let bare: ItemBody<u8> = serde_json::from_str("7").unwrap();
        assert_eq!(bare.into_inner(), 7);
    }
}
