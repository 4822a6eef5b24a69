//! Application state shared across handlers.

use std::sync::Arc;

use shopfront_api::ApiClient;

use crate::config::StorefrontConfig;
use crate::theme::ThemeStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    theme: ThemeStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let api = ApiClient::new(&config.api);
        let theme = ThemeStore::new(config.theme_path.clone());

        Self {
            inner: Arc::new(AppStateInner { config, api, theme }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the live theme.
    #[must_use]
    pub fn theme(&self) -> &ThemeStore {
        &self.inner.theme
    }
}
