//! Live theme loaded from the JSON file the admin writes.
//!
//! The file is checked on access: when its modification time differs from
//! the one last loaded, it is parsed and validated again and the rendered
//! stylesheet is replaced. Readers hold an `Arc` to whichever stylesheet was
//! current when they asked, so a swap never exposes a half-written sheet.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use shopfront_core::{ThemeConfig, ThemeError, ThemeStylesheet};
use thiserror::Error;
use tokio::sync::RwLock;

/// Reasons a theme file could not be used.
#[derive(Debug, Error)]
pub enum ThemeStoreError {
    #[error("failed to read theme file: {0}")]
    Io(#[from] std::io::Error),

    #[error("theme file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("theme file has invalid values: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ThemeError>),
}

/// Read, parse and validate a theme file.
pub async fn load_theme_file(path: &Path) -> Result<ThemeConfig, ThemeStoreError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let config: ThemeConfig = serde_json::from_str(&contents)?;
    config.validate().map_err(ThemeStoreError::Invalid)?;
    Ok(config)
}

struct Loaded {
    stylesheet: Arc<ThemeStylesheet>,
    /// `None` when the file was missing at last check.
    modified: Option<SystemTime>,
}

/// The stylesheet currently in effect.
pub struct ThemeStore {
    path: PathBuf,
    current: RwLock<Loaded>,
}

impl ThemeStore {
    /// Start with the default theme; the file is read on first access.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            current: RwLock::new(Loaded {
                stylesheet: Arc::new(ThemeStylesheet::default()),
                modified: None,
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current stylesheet, reloading it first if the file changed.
    pub async fn stylesheet(&self) -> Arc<ThemeStylesheet> {
        let modified = self.file_mtime().await;

        {
            let current = self.current.read().await;
            if current.modified == modified {
                return current.stylesheet.clone();
            }
        }

        let mut current = self.current.write().await;
        // Another request may have reloaded while we waited for the lock
        if current.modified == modified {
            return current.stylesheet.clone();
        }

        let config = match modified {
            Some(_) => match load_theme_file(&self.path).await {
                Ok(config) => {
                    tracing::info!(path = %self.path.display(), "Theme reloaded");
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Falling back to default theme"
                    );
                    ThemeConfig::default()
                }
            },
            None => {
                tracing::warn!(path = %self.path.display(), "Theme file removed, using default theme");
                ThemeConfig::default()
            }
        };

        current.stylesheet = Arc::new(ThemeStylesheet::render(&config));
        current.modified = modified;
        current.stylesheet.clone()
    }

    async fn file_mtime(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_theme(path: &Path, config: &ThemeConfig) {
        std::fs::write(path, serde_json::to_string(config).unwrap()).unwrap();
    }

    /// Push the file's mtime forward so a rewrite within the same
    /// filesystem timestamp tick is still seen as a change.
    fn touch_later(path: &Path, secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + std::time::Duration::from_secs(secs))
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("theme.json"));
        let sheet = store.stylesheet().await;
        assert_eq!(*sheet, ThemeStylesheet::default());
    }

    #[tokio::test]
    async fn test_reloads_when_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        let store = ThemeStore::new(path.clone());

        let mut config = ThemeConfig::default();
        config.primary_color = "#ff0000".to_string();
        write_theme(&path, &config);

        let first = store.stylesheet().await;
        assert!(first.css().contains("--color-primary: #ff0000;"));

        config.primary_color = "#00ff00".to_string();
        write_theme(&path, &config);
        touch_later(&path, 5);

        let second = store.stylesheet().await;
        assert!(second.css().contains("--color-primary: #00ff00;"));
        assert_ne!(first.version(), second.version());
    }

    #[tokio::test]
    async fn test_unchanged_file_returns_same_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        write_theme(&path, &ThemeConfig::default());
        let store = ThemeStore::new(path);

        let a = store.stylesheet().await;
        let b = store.stylesheet().await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_invalid_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, r#"{"primary_color": "red; } body { display:none"}"#).unwrap();

        let err = load_theme_file(&path).await.unwrap_err();
        assert!(matches!(err, ThemeStoreError::Invalid(_)));

        let store = ThemeStore::new(path);
        assert_eq!(*store.stylesheet().await, ThemeStylesheet::default());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_theme_file(&path).await.unwrap_err(),
            ThemeStoreError::Parse(_)
        ));
    }
}
