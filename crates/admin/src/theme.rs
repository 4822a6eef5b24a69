//! Reading and writing the shared theme file.
//!
//! The storefront watches the same file, so a save must never leave it
//! half-written: the new contents go to a temporary file in the same
//! directory which is then renamed over the old one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use shopfront_core::{ThemeConfig, ThemeError};
use thiserror::Error;

/// Reasons the theme file could not be read or written.
#[derive(Debug, Error)]
pub enum ThemeFileError {
    #[error("theme file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("theme file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("theme has invalid values: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ThemeError>),
}

/// Load the saved theme. A missing file means the default theme.
pub async fn load(path: &Path) -> Result<ThemeConfig, ThemeFileError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ThemeConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Validate and atomically replace the theme file.
pub async fn save(path: &Path, config: &ThemeConfig) -> Result<(), ThemeFileError> {
    config.validate().map_err(ThemeFileError::Invalid)?;

    let mut contents = serde_json::to_string_pretty(config)?;
    contents.push('\n');

    let temp = temp_path(path);
    tokio::fs::write(&temp, contents).await?;
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        // Leave no stray temp file behind; the original is untouched.
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }

    tracing::info!(path = %path.display(), "Theme saved");
    Ok(())
}

/// Sibling path for the in-progress write, unique per save.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "theme.json".into(), |n| n.to_string_lossy());
    path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("theme.json")).await.unwrap();
        assert_eq!(config, ThemeConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        let config = ThemeConfig {
            primary_color: "#ff0066".to_string(),
            ..ThemeConfig::default()
        };

        save(&path, &config).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), config);

        // Only the theme file remains; the temp file was renamed away.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_theme_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        save(&path, &ThemeConfig::default()).await.unwrap();

        let bad = ThemeConfig {
            accent_color: "orange; }".to_string(),
            ..ThemeConfig::default()
        };
        let err = save(&path, &bad).await.unwrap_err();
        assert!(matches!(err, ThemeFileError::Invalid(ref errors) if errors.len() == 1));
        assert_eq!(load(&path).await.unwrap(), ThemeConfig::default());
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("theme.json");
        let err = save(&path, &ThemeConfig::default()).await.unwrap_err();
        assert!(matches!(err, ThemeFileError::Io(_)));
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path(Path::new("/srv/shop/theme.json"));
        assert_eq!(temp.parent(), Some(Path::new("/srv/shop")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".theme.json."));
        assert!(name.ends_with(".tmp"));
    }
}
