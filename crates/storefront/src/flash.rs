//! One-shot toast messages carried across a redirect.
//!
//! Handlers queue a message in the session; the next rendered page takes
//! every queued message and shows it once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    /// CSS class for the toast.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "toast toast-success",
            FlashKind::Info => "toast toast-info",
            FlashKind::Error => "toast toast-error",
        }
    }
}

/// Queue a toast. Failures are logged: a lost toast should not fail the
/// action that produced it.
pub async fn push(session: &Session, kind: FlashKind, message: impl Into<String>) {
    let mut queued: Vec<Flash> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(Flash {
        kind,
        message: message.into(),
    });

    if let Err(e) = session.insert(session_keys::FLASH, queued).await {
        tracing::warn!(error = %e, "Failed to queue flash message");
    }
}

pub async fn success(session: &Session, message: impl Into<String>) {
    push(session, FlashKind::Success, message).await;
}

pub async fn info(session: &Session, message: impl Into<String>) {
    push(session, FlashKind::Info, message).await;
}

pub async fn error(session: &Session, message: impl Into<String>) {
    push(session, FlashKind::Error, message).await;
}

/// Take every queued toast, leaving none behind.
pub async fn take(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn test_flashes_are_shown_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        success(&session, "Added to cart").await;
        error(&session, "Out of stock").await;

        let flashes = take(&session).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].message, "Added to cart");
        assert_eq!(flashes[1].css_class(), "toast toast-error");

        assert!(take(&session).await.is_empty());
    }
}
