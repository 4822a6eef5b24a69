//! Session-stored admin identity.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use shopfront_core::{AuthSession, UserId};

/// The signed-in administrator.
///
/// Keeps the backend bearer token so admin calls can be made on the
/// administrator's behalf. `Debug` is implemented manually to redact it.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user ID.
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    access_token: String,
}

impl CurrentAdmin {
    /// Name for the header, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }
}

impl From<AuthSession> for CurrentAdmin {
    fn from(session: AuthSession) -> Self {
        Self {
            id: session.user.id,
            email: session.user.email,
            name: session.user.name,
            access_token: session.access_token,
        }
    }
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for admin data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for pending toast messages.
    pub const FLASH: &str = "flash";
}
