//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{ProductFilter, ProductSort};

use crate::filters;
use crate::models::session::load_wishlist;
use crate::routes::PageContext;
use crate::routes::categories::CategoryView;
use crate::routes::products::ProductView;
use crate::state::AppState;

const FEATURED_PRODUCTS: usize = 8;
const SALE_PRODUCTS: usize = 4;
const HOME_CATEGORIES: usize = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub featured_products: Vec<ProductView>,
    pub sale_products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    /// The catalog could not be loaded; the page renders without it.
    pub catalog_unavailable: bool,
}

/// Display the home page.
///
/// Backend failures degrade to an empty page rather than an error.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let (products, categories) = tokio::join!(state.api().products(), state.api().categories());

    let catalog_unavailable = products.is_err();
    let products = products.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load products for home page");
        Vec::new()
    });
    let categories = categories.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories for home page");
        Vec::new()
    });

    let mut visible = ProductFilter::storefront().apply(products);
    ProductSort::Newest.sort(&mut visible);
    let wishlist = load_wishlist(&session).await;

    let featured: Vec<_> = visible.iter().take(FEATURED_PRODUCTS).cloned().collect();
    let on_sale: Vec<_> = visible
        .iter()
        .filter(|p| p.is_on_sale())
        .take(SALE_PRODUCTS)
        .cloned()
        .collect();

    HomeTemplate {
        ctx: PageContext::load(&state, &session).await,
        featured_products: ProductView::list(&featured, &categories, &wishlist),
        sale_products: ProductView::list(&on_sale, &categories, &wishlist),
        categories: CategoryView::list(&categories, &visible)
            .into_iter()
            .take(HOME_CATEGORIES)
            .collect(),
        catalog_unavailable,
    }
}
