//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//! GET  /theme.css              - Live theme stylesheet
//!
//! # Catalog
//! GET  /products               - Product listing (q, category, min_price, max_price,
//!                                in_stock, sort, page)
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category listing
//! GET  /categories/{id}        - Products in a category
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart
//! POST /cart/increase          - Increment a line
//! POST /cart/decrease          - Decrement a line (removes it at 1)
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/toggle        - Save or unsave a product
//! POST /wishlist/remove        - Unsave a product
//! POST /wishlist/move-to-cart  - Move a saved product into the cart
//! POST /wishlist/clear         - Unsave everything
//!
//! # Checkout
//! GET  /checkout               - Order summary and shipping form
//! POST /checkout               - Place the order
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//! ```
//!
//! Every cart and wishlist POST answers an HTMX request with the cart count
//! badge and an `HX-Trigger` header instead of a redirect.

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod products;
pub mod theme;
pub mod wishlist;

use axum::{
    Router,
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::flash::{self, Flash, FlashKind};
use crate::middleware::auth::current_user;
use crate::models::CurrentUser;
use crate::models::session::{load_cart, load_wishlist};
use crate::state::AppState;

// =============================================================================
// Layout context
// =============================================================================

/// Data every full page renders in its layout: header badges, the signed-in
/// user, pending toasts and the theme version for cache busting.
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub wishlist_count: usize,
    pub flashes: Vec<Flash>,
    pub theme_version: String,
}

impl PageContext {
    /// Gather layout data. Consumes pending toasts.
    pub async fn load(state: &AppState, session: &Session) -> Self {
        let stylesheet = state.theme().stylesheet().await;
        Self {
            user: current_user(session).await,
            cart_count: load_cart(session).await.item_count(),
            wishlist_count: load_wishlist(session).await.len(),
            flashes: flash::take(session).await,
            theme_version: stylesheet.version().to_string(),
        }
    }
}

/// Redirect to a form-supplied return path, falling back when it is absent
/// or not a local path.
pub fn redirect_back(return_to: Option<&str>, fallback: &str) -> Redirect {
    let target = return_to
        .map(str::trim)
        .filter(|path| is_local_path(path))
        .unwrap_or(fallback);
    Redirect::to(target)
}

/// `/foo?x=1` but not `//evil.example` or `/\evil.example`.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}

/// Whether the request came from an HTMX swap.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Finish a cart or wishlist action.
///
/// Plain form posts queue the toast and follow `back`. HTMX swaps get the
/// cart count badge with an `HX-Trigger` carrying `cart-updated`, plus a
/// `toast` event when there is something to tell the shopper, so an error
/// never swaps a whole page into the badge.
pub async fn action_reply(
    session: &Session,
    headers: &HeaderMap,
    back: Redirect,
    toast: Option<(FlashKind, String)>,
) -> Response {
    if !is_htmx(headers) {
        if let Some((kind, message)) = toast {
            flash::push(session, kind, message).await;
        }
        return back.into_response();
    }

    let count = load_cart(session).await.item_count();
    let mut response = cart::CartCountTemplate { count }.into_response();
    response
        .headers_mut()
        .insert(HeaderName::from_static("hx-trigger"), hx_trigger(toast.as_ref()));
    response
}

/// `cart-updated` alone, or a JSON event map that also raises `toast`.
fn hx_trigger(toast: Option<&(FlashKind, String)>) -> HeaderValue {
    let plain = HeaderValue::from_static("cart-updated");
    let Some((kind, message)) = toast else {
        return plain;
    };

    let events = serde_json::json!({
        "cart-updated": null,
        "toast": { "kind": kind, "message": message },
    });
    HeaderValue::from_str(&ascii_json(&events.to_string())).unwrap_or(plain)
}

/// Escape non-ASCII characters as `\uXXXX`.
///
/// Browsers decode header bytes as Latin-1, so raw UTF-8 would reach the
/// toast as mojibake. JSON only allows non-ASCII inside strings, where the
/// escape form is equivalent.
fn ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/remove", post(wishlist::remove))
        .route("/move-to-cart", post(wishlist::move_to_cart))
        .route("/clear", post(wishlist::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/theme.css", get(theme::stylesheet))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .route("/account", get(account::index))
        .nest("/auth", auth_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/products?page=2"));
        assert!(is_local_path("/"));
        assert!(!is_local_path("//evil.example/x"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path("/ok\r\nSet-Cookie: x"));
        assert!(!is_local_path(""));
    }

    #[test]
    fn test_hx_trigger_without_toast_is_plain_event() {
        assert_eq!(hx_trigger(None), "cart-updated");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_hx_trigger_carries_toast() {
        let toast = (FlashKind::Error, "Enamel Mug is out of stock".to_string());
        let value = hx_trigger(Some(&toast));
        let events: serde_json::Value = serde_json::from_str(value.to_str().unwrap()).unwrap();

        assert!(events.get("cart-updated").is_some());
        assert_eq!(events["toast"]["kind"], "error");
        assert_eq!(events["toast"]["message"], "Enamel Mug is out of stock");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_hx_trigger_escapes_non_ascii() {
        let toast = (FlashKind::Success, "Saved Café Mug 🍵".to_string());
        let value = hx_trigger(Some(&toast));

        assert!(value.as_bytes().is_ascii());
        let raw = value.to_str().unwrap();
        assert!(raw.contains(r"Caf\u00e9"));
        assert!(raw.contains(r"\ud83c\udf75"));
        let events: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(events["toast"]["message"], "Saved Café Mug 🍵");
    }
}
