//! Session-related types.
//!
//! The storefront keeps all shopper state in the session: who is signed in,
//! the cart, the wishlist and pending toasts.

use serde::{Deserialize, Serialize};
use shopfront_core::{AuthUser, Cart, UserId, UserRole, Wishlist};
use tower_sessions::Session;

/// Session-stored user identity.
///
/// The backend access token is not kept: the storefront only reads public
/// catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
}

impl CurrentUser {
    /// Name for greetings, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

impl From<&AuthUser> for CurrentUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the wishlist.
    pub const WISHLIST: &str = "wishlist";

    /// Key for pending toast messages.
    pub const FLASH: &str = "flash";
}

// =============================================================================
// Cart and wishlist persistence
// =============================================================================

/// Load the cart, or an empty one if none is stored or it cannot be read.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(keys::CART)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable cart");
            None
        })
        .unwrap_or_default()
}

pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Load the wishlist, or an empty one if none is stored or it cannot be read.
pub async fn load_wishlist(session: &Session) -> Wishlist {
    session
        .get::<Wishlist>(keys::WISHLIST)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable wishlist");
            None
        })
        .unwrap_or_default()
}

pub async fn save_wishlist(
    session: &Session,
    wishlist: &Wishlist,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::WISHLIST, wishlist).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use shopfront_core::Product;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_cart_round_trips_through_session() {
        let session = session();
        assert!(load_cart(&session).await.is_empty());

        let product: Product =
            serde_json::from_value(json!({ "id": 3, "name": "Mug", "price": "12.00" })).unwrap();
        let mut cart = load_cart(&session).await;
        cart.add(&product, 2);
        save_cart(&session, &cart).await.unwrap();

        let restored = load_cart(&session).await;
        assert_eq!(restored.item_count(), 2);
        assert_eq!(restored.subtotal().display(), "$24.00");
    }

    #[tokio::test]
    async fn test_corrupt_cart_is_replaced_with_empty() {
        let session = session();
        session.insert(keys::CART, "not a cart").await.unwrap();
        assert!(load_cart(&session).await.is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = CurrentUser {
            id: UserId::new(1),
            email: "ada@example.com".to_string(),
            name: Some("  ".to_string()),
            role: UserRole::Customer,
        };
        assert_eq!(user.display_name(), "ada@example.com");
        user.name = Some("Ada".to_string());
        assert_eq!(user.display_name(), "Ada");
    }
}
