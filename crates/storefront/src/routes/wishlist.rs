//! Wishlist route handlers.

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
use shopfront_core::{ProductId, Wishlist};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash::FlashKind;
use crate::models::session::{load_cart, load_wishlist, save_cart, save_wishlist};
use crate::routes::cart::{UNAVAILABLE, only_available, product_for_cart};
use crate::routes::{PageContext, action_reply, redirect_back};
use crate::state::AppState;

/// Saved product display data for templates.
#[derive(Clone)]
pub struct WishlistItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub price: String,
}

impl WishlistItemView {
    fn list(wishlist: &Wishlist) -> Vec<Self> {
        wishlist
            .items()
            .iter()
            .map(|item| Self {
                product_id: item.product_id,
                name: item.name.clone(),
                image_url: item.image_url.clone(),
                price: item.price.to_string(),
            })
            .collect()
    }
}

/// Form naming a product, with an optional page to return to.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: ProductId,
    pub return_to: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub ctx: PageContext,
    pub items: Vec<WishlistItemView>,
}

/// Display wishlist page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let wishlist = load_wishlist(&session).await;

    WishlistShowTemplate {
        items: WishlistItemView::list(&wishlist),
        ctx: PageContext::load(&state, &session).await,
    }
}

/// Save or unsave a product.
#[instrument(skip(state, session, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let back = redirect_back(form.return_to.as_deref(), "/wishlist");
    let mut wishlist = load_wishlist(&session).await;

    // Unsaving needs no catalog lookup, which keeps it working for products
    // that have since been deleted.
    if wishlist.remove(form.product_id) {
        save_wishlist(&session, &wishlist).await?;
        let toast = Some((FlashKind::Info, REMOVED.to_string()));
        return Ok(action_reply(&session, &headers, back, toast).await);
    }

    let product = match state.api().product(form.product_id).await {
        Ok(product) if product.status.is_visible() => product,
        Ok(_) | Err(ApiError::NotFound { .. }) => {
            let toast = Some((FlashKind::Error, UNAVAILABLE.to_string()));
            return Ok(action_reply(&session, &headers, back, toast).await);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load product for wishlist");
            let toast = Some((FlashKind::Error, e.user_message()));
            return Ok(action_reply(&session, &headers, back, toast).await);
        }
    };

    wishlist.add(&product);
    save_wishlist(&session, &wishlist).await?;
    add_breadcrumb(
        "wishlist",
        "Saved to wishlist",
        Some(&[("product_id", &product.id.to_string())]),
    );
    let toast = Some((
        FlashKind::Success,
        format!("Saved {} to your wishlist", product.name),
    ));
    Ok(action_reply(&session, &headers, back, toast).await)
}

#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let mut wishlist = load_wishlist(&session).await;
    let toast = if wishlist.remove(form.product_id) {
        save_wishlist(&session, &wishlist).await?;
        Some((FlashKind::Info, REMOVED.to_string()))
    } else {
        None
    };
    let back = redirect_back(form.return_to.as_deref(), "/wishlist");
    Ok(action_reply(&session, &headers, back, toast).await)
}

#[instrument(skip(session, headers))]
pub async fn clear(session: Session, headers: HeaderMap) -> Result<Response> {
    let mut wishlist = load_wishlist(&session).await;
    wishlist.clear();
    save_wishlist(&session, &wishlist).await?;
    let toast = Some((FlashKind::Info, "Your wishlist is empty".to_string()));
    Ok(action_reply(&session, &headers, Redirect::to("/wishlist"), toast).await)
}

/// Move a saved product into the cart as one unit.
///
/// The product is looked up like any other add, so hidden or sold-out
/// products stay on the wishlist and the line takes today's price.
#[instrument(skip(state, session, headers))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let back = redirect_back(form.return_to.as_deref(), "/wishlist");
    let mut wishlist = load_wishlist(&session).await;
    if !wishlist.contains(form.product_id) {
        let toast = Some((FlashKind::Error, NOT_SAVED.to_string()));
        return Ok(action_reply(&session, &headers, back, toast).await);
    }

    let product = match product_for_cart(&state, form.product_id).await {
        Ok(product) => product,
        Err(message) => {
            let toast = Some((FlashKind::Error, message));
            return Ok(action_reply(&session, &headers, back, toast).await);
        }
    };

    let mut cart = load_cart(&session).await;
    wishlist.move_to_cart(&product, &mut cart);
    let toast = match cart.limit_to_stock(&product) {
        Some(_) => only_available(&product),
        None => (
            FlashKind::Success,
            format!("Moved {} to your cart", product.name),
        ),
    };
    save_cart(&session, &cart).await?;
    save_wishlist(&session, &wishlist).await?;

    Ok(action_reply(&session, &headers, back, Some(toast)).await)
}

const REMOVED: &str = "Removed from your wishlist";
const NOT_SAVED: &str = "That item is no longer on your wishlist";
