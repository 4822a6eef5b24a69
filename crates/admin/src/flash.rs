//! One-shot notices shown after a redirect.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    /// Tailwind classes for the notice banner.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "bg-green-50 text-green-800 border-green-200",
            FlashKind::Error => "bg-red-50 text-red-800 border-red-200",
        }
    }
}

async fn push(session: &Session, kind: FlashKind, message: String) {
    let mut queued: Vec<Flash> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(Flash { kind, message });

    if let Err(e) = session.insert(session_keys::FLASH, queued).await {
        tracing::warn!(error = %e, "Failed to queue flash message");
    }
}

pub async fn success(session: &Session, message: impl Into<String>) {
    push(session, FlashKind::Success, message.into()).await;
}

pub async fn error(session: &Session, message: impl Into<String>) {
    push(session, FlashKind::Error, message.into()).await;
}

/// Take every queued notice.
pub async fn take(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}
