//! Cart route handlers.
//!
//! The cart lives in the session. Adding a product fetches it from the
//! backend so the cached name, image and price are current at add time.
//! Raising a quantity fetches it again so the line never exceeds stock;
//! lowering or removing works on the session copy only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_api::ApiError;
use shopfront_core::cart::MAX_LINE_QUANTITY;
use shopfront_core::{Cart, CartError, CheckoutSummary, Product, ProductId, ShippingPolicy};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash::FlashKind;
use crate::models::session::{load_cart, save_cart};
use crate::routes::{PageContext, action_reply, redirect_back};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    /// Quantity is at the per-line cap; the increase button is disabled.
    pub at_max: bool,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub free_shipping: bool,
    pub total: String,
    /// "Spend $X more for free shipping" amount.
    pub free_shipping_remaining: Option<String>,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, policy: &ShippingPolicy) -> Self {
        let summary = CheckoutSummary::new(cart, policy);
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    image_url: item.image_url.clone(),
                    unit_price: item.unit_price.to_string(),
                    quantity: item.quantity,
                    line_total: item.line_total().to_string(),
                    at_max: item.quantity >= MAX_LINE_QUANTITY,
                })
                .collect(),
            item_count: summary.item_count,
            subtotal: summary.subtotal.to_string(),
            shipping: summary.shipping.to_string(),
            free_shipping: summary.shipping.is_zero(),
            total: summary.total.to_string(),
            free_shipping_remaining: summary.free_shipping_remaining.map(|p| p.to_string()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    /// Page to return to after a non-HTMX submit.
    pub return_to: Option<String>,
}

/// Form naming a single cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: ProductId,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateLineForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        cart: CartView::new(&cart, &state.config().shipping),
        ctx: PageContext::load(&state, &session).await,
    }
}

/// Look up a product the shopper wants in their cart.
///
/// Hidden and sold-out products are refused with the message to show.
pub(crate) async fn product_for_cart(
    state: &AppState,
    product_id: ProductId,
) -> std::result::Result<Product, String> {
    match state.api().product(product_id).await {
        Ok(product) if !product.status.is_visible() => Err(UNAVAILABLE.to_string()),
        Ok(product) if !product.in_stock() => Err(format!("{} is out of stock", product.name)),
        Ok(product) => Ok(product),
        Err(ApiError::NotFound { .. }) => Err(UNAVAILABLE.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, %product_id, "Failed to load product for cart");
            Err(e.user_message())
        }
    }
}

pub(crate) const UNAVAILABLE: &str = "That product is no longer available";
const NOT_IN_CART: &str = "That item is no longer in your cart";

/// Toast for a line that was capped at the product's stock.
pub(crate) fn only_available(product: &Product) -> (FlashKind, String) {
    (
        FlashKind::Info,
        format!("Only {} of {} available", product.stock, product.name),
    )
}

/// Add a product to the cart.
///
/// HTMX requests get the updated count badge and a `cart-updated` trigger;
/// plain form posts are redirected back with a toast.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let back = redirect_back(form.return_to.as_deref(), "/cart");

    let product = match product_for_cart(&state, form.product_id).await {
        Ok(product) => product,
        Err(message) => {
            let toast = Some((FlashKind::Error, message));
            return Ok(action_reply(&session, &headers, back, toast).await);
        }
    };

    let mut cart = load_cart(&session).await;
    let mut quantity = cart.add(&product, form.quantity.unwrap_or(1));
    let toast = match cart.limit_to_stock(&product) {
        Some(capped) => {
            quantity = capped;
            only_available(&product)
        }
        None => (
            FlashKind::Success,
            format!("Added {} to your cart", product.name),
        ),
    };
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", &product.id.to_string()),
            ("quantity", &quantity.to_string()),
        ]),
    );

    Ok(action_reply(&session, &headers, back, Some(toast)).await)
}

/// Increment a line, up to the product's stock.
#[instrument(skip(state, session, headers))]
pub async fn increase(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    if !load_cart(&session).await.contains(form.product_id) {
        return Ok(line_gone(&session, &headers).await);
    }
    set_within_stock(&state, &session, &headers, form.product_id, |cart| {
        cart.increase(form.product_id)
    })
    .await
}

/// Decrement a line; a line at quantity one is removed.
#[instrument(skip(session, headers))]
pub async fn decrease(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    match cart.decrease(form.product_id) {
        Ok(_) => {
            save_cart(&session, &cart).await?;
            Ok(action_reply(&session, &headers, Redirect::to("/cart"), None).await)
        }
        Err(CartError::ItemNotFound(_)) => Ok(line_gone(&session, &headers).await),
    }
}

/// Set a line's quantity, up to the product's stock; zero removes it.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateLineForm>,
) -> Result<Response> {
    if form.quantity == 0 {
        return remove_line(&session, &headers, form.product_id).await;
    }
    if !load_cart(&session).await.contains(form.product_id) {
        return Ok(line_gone(&session, &headers).await);
    }
    set_within_stock(&state, &session, &headers, form.product_id, |cart| {
        cart.set_quantity(form.product_id, form.quantity)
    })
    .await
}

/// Apply `change` to a line after checking the product is still sellable,
/// then cap the line at the stock level.
async fn set_within_stock(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    product_id: ProductId,
    change: impl FnOnce(&mut Cart) -> std::result::Result<u32, CartError>,
) -> Result<Response> {
    let back = Redirect::to("/cart");
    let product = match product_for_cart(state, product_id).await {
        Ok(product) => product,
        Err(message) => {
            let toast = Some((FlashKind::Error, message));
            return Ok(action_reply(session, headers, back, toast).await);
        }
    };

    let mut cart = load_cart(session).await;
    if change(&mut cart).is_err() {
        return Ok(line_gone(session, headers).await);
    }
    let toast = cart.limit_to_stock(&product).map(|_| only_available(&product));
    save_cart(session, &cart).await?;

    Ok(action_reply(session, headers, back, toast).await)
}

async fn line_gone(session: &Session, headers: &HeaderMap) -> Response {
    let toast = Some((FlashKind::Error, NOT_IN_CART.to_string()));
    action_reply(session, headers, Redirect::to("/cart"), toast).await
}

async fn remove_line(
    session: &Session,
    headers: &HeaderMap,
    product_id: ProductId,
) -> Result<Response> {
    let mut cart = load_cart(session).await;
    match cart.remove(product_id) {
        Ok(item) => {
            save_cart(session, &cart).await?;
            let toast = Some((
                FlashKind::Info,
                format!("Removed {} from your cart", item.name),
            ));
            Ok(action_reply(session, headers, Redirect::to("/cart"), toast).await)
        }
        Err(CartError::ItemNotFound(_)) => Ok(line_gone(session, headers).await),
    }
}

#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    remove_line(&session, &headers, form.product_id).await
}

#[instrument(skip(session, headers))]
pub async fn clear(session: Session, headers: HeaderMap) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;
    let toast = Some((FlashKind::Info, "Your cart is empty".to_string()));
    Ok(action_reply(&session, &headers, Redirect::to("/cart"), toast).await)
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: i32, price: &str) -> Product {
        serde_json::from_value(json!({ "id": id, "name": format!("P{id}"), "price": price }))
            .unwrap()
    }

    #[test]
    fn test_cart_view_totals_below_free_shipping() {
        let mut cart = Cart::new();
        cart.add(&product(1, "10.00"), 2);
        let view = CartView::new(&cart, &ShippingPolicy::default());

        assert_eq!(view.item_count, 2);
        assert_eq!(view.items[0].line_total, "$20.00");
        assert_eq!(view.subtotal, "$20.00");
        assert_eq!(view.shipping, "$5.99");
        assert_eq!(view.total, "$25.99");
        assert_eq!(view.free_shipping_remaining.as_deref(), Some("$30.00"));
        assert!(!view.free_shipping);
    }

    #[test]
    fn test_cart_view_free_shipping() {
        let mut cart = Cart::new();
        cart.add(&product(1, "25.00"), 2);
        let view = CartView::new(&cart, &ShippingPolicy::default());
        assert!(view.free_shipping);
        assert_eq!(view.total, "$50.00");
        assert!(view.free_shipping_remaining.is_none());
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::new(&Cart::new(), &ShippingPolicy::default());
        assert!(view.is_empty());
        assert_eq!(view.total, "$0.00");
    }
}
