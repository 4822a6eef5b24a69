//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::models::session::{load_cart, load_wishlist};
use crate::routes::PageContext;
use crate::routes::cart::CartView;
use crate::state::AppState;

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub ctx: PageContext,
    pub user: CurrentUser,
    pub cart: CartView,
    pub wishlist_names: Vec<String>,
}

/// Display account overview page.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    let wishlist = load_wishlist(&session).await;

    AccountIndexTemplate {
        cart: CartView::new(&cart, &state.config().shipping),
        wishlist_names: wishlist.items().iter().map(|i| i.name.clone()).collect(),
        user,
        ctx: PageContext::load(&state, &session).await,
    }
}
