//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Category, CategoryId, Product, ProductFilter};

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::PageContext;
use crate::routes::products::{ListingQuery, ListingView, build_listing};
use crate::state::AppState;

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Visible products in the category.
    pub product_count: usize,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            image_url: category.image_url.clone(),
            product_count: 0,
        }
    }
}

impl CategoryView {
    /// Build views with product counts taken from `products`.
    #[must_use]
    pub fn list(categories: &[Category], products: &[Product]) -> Vec<Self> {
        let visible = ProductFilter::storefront();
        categories
            .iter()
            .map(|category| Self {
                product_count: products
                    .iter()
                    .filter(|p| p.category_id() == Some(category.id) && visible.matches(p))
                    .count(),
                ..Self::from(category)
            })
            .collect()
    }
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub ctx: PageContext,
    pub categories: Vec<CategoryView>,
}

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub ctx: PageContext,
    pub category: CategoryView,
    pub listing: ListingView,
}

/// Display all categories.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let categories = state.api().categories().await?;
    let products = state.api().products().await?;

    Ok(CategoriesIndexTemplate {
        ctx: PageContext::load(&state, &session).await,
        categories: CategoryView::list(&categories, &products),
    })
}

/// Display the products in one category.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let id: CategoryId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("category {id}")))?;

    let category = state.api().category(id).await?;
    let listing = build_listing(
        &state,
        &session,
        &query,
        &format!("/categories/{id}"),
        Some(id),
    )
    .await?;

    Ok(CategoryShowTemplate {
        ctx: PageContext::load(&state, &session).await,
        category: CategoryView {
            product_count: listing.total_items,
            ..CategoryView::from(&category)
        },
        listing,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_counts_skip_hidden_products() {
        let categories: Vec<Category> = serde_json::from_value(json!([
            { "id": 1, "name": "Bags" },
            { "id": 2, "name": "Scarves" }
        ]))
        .unwrap();
        let products: Vec<Product> = serde_json::from_value(json!([
            { "id": 1, "name": "Tote", "price": 10, "categoryId": 1 },
            { "id": 2, "name": "Clutch", "price": 10, "categoryId": 1, "status": "draft" },
            { "id": 3, "name": "Wool", "price": 10, "category": { "id": 2, "name": "Scarves" } }
        ]))
        .unwrap();

        let views = CategoryView::list(&categories, &products);
        assert_eq!(views[0].product_count, 1);
        assert_eq!(views[1].product_count, 1);
    }
}
