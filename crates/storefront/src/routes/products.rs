//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::cart::MAX_LINE_QUANTITY;
use shopfront_core::listing::normalize_search;
use shopfront_core::{
    Category, CategoryId, Page, Price, Product, ProductFilter, ProductId, ProductSort, Wishlist,
};

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session::load_wishlist;
use crate::routes::PageContext;
use crate::state::AppState;

/// How many related products the detail page shows.
const RELATED_PRODUCTS: usize = 4;

// =============================================================================
// Views
// =============================================================================

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub in_stock: bool,
    pub stock: u32,
    pub rating: Option<f32>,
    pub wishlisted: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.unit_price().to_string(),
            compare_at_price: product
                .compare_at_price
                .filter(|_| product.is_on_sale())
                .map(|was| Price::usd(was).to_string()),
            discount_percent: product.discount_percent(),
            image_url: product.image_url.clone(),
            category_id: product.category_id(),
            category_name: product.category_name().map(String::from),
            in_stock: product.in_stock(),
            stock: product.stock,
            rating: product.rating,
            wishlisted: false,
        }
    }
}

impl ProductView {
    /// Build a view, filling in the category name the backend did not embed
    /// and marking whether the product is on the wishlist.
    #[must_use]
    pub fn build(product: &Product, categories: &[Category], wishlist: &Wishlist) -> Self {
        let mut view = Self::from(product);
        if view.category_name.is_none() {
            view.category_name = view.category_id.and_then(|id| {
                categories
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.name.clone())
            });
        }
        view.wishlisted = wishlist.contains(product.id);
        view
    }

    #[must_use]
    pub fn list(products: &[Product], categories: &[Category], wishlist: &Wishlist) -> Vec<Self> {
        products
            .iter()
            .map(|product| Self::build(product, categories, wishlist))
            .collect()
    }
}

/// Category option in the filter sidebar.
#[derive(Clone)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
    pub selected: bool,
}

/// Sort option in the sort dropdown.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

// =============================================================================
// Listing query
// =============================================================================

/// Listing query parameters.
///
/// Kept as strings so that blank form fields (`min_price=`) and typos are
/// ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl ListingQuery {
    /// Shopper-facing filter; `category` overrides the query's category.
    #[must_use]
    pub fn filter(&self, category: Option<CategoryId>) -> ProductFilter {
        ProductFilter {
            search: normalize_search(self.q.as_deref()),
            category: category.or_else(|| {
                self.category
                    .as_deref()
                    .and_then(|c| c.trim().parse().ok())
            }),
            min_price: parse_price(self.min_price.as_deref()),
            max_price: parse_price(self.max_price.as_deref()),
            in_stock_only: self.in_stock_only(),
            ..ProductFilter::storefront()
        }
    }

    #[must_use]
    pub fn sort(&self) -> ProductSort {
        ProductSort::parse_or_default(self.sort.as_deref())
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }

    fn in_stock_only(&self) -> bool {
        matches!(self.in_stock.as_deref(), Some("on" | "true" | "1"))
    }

    /// Link to another page of the same listing.
    fn page_href(
        &self,
        base_path: &str,
        filter: &ProductFilter,
        category_locked: bool,
        page: usize,
    ) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(q) = &filter.search {
            query.append_pair("q", q);
        }
        if !category_locked && let Some(category) = filter.category {
            query.append_pair("category", &category.to_string());
        }
        if let Some(min) = filter.min_price {
            query.append_pair("min_price", &min.to_string());
        }
        if let Some(max) = filter.max_price {
            query.append_pair("max_price", &max.to_string());
        }
        if filter.in_stock_only {
            query.append_pair("in_stock", "on");
        }
        let sort = self.sort();
        if sort != ProductSort::default() {
            query.append_pair("sort", sort.as_str());
        }
        query.append_pair("page", &page.to_string());
        format!("{base_path}?{}", query.finish())
    }
}

/// Parse a non-negative price; anything else is ignored.
fn parse_price(value: Option<&str>) -> Option<Decimal> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<Decimal>().ok())
        .filter(|d| !d.is_sign_negative())
}

/// A filtered, sorted page of products with everything the listing partial
/// needs.
pub struct ListingView {
    pub action: String,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryOption>,
    pub category_locked: bool,
    pub sort_options: Vec<SortOption>,
    pub q: String,
    pub min_price: String,
    pub max_price: String,
    pub in_stock: bool,
    pub filters_active: bool,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub first_item: usize,
    pub last_item: usize,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

/// Fetch the catalog and narrow it to one listing page.
///
/// `locked_category` restricts the listing to a category regardless of the
/// query (used by category pages).
pub async fn build_listing(
    state: &AppState,
    session: &Session,
    query: &ListingQuery,
    base_path: &str,
    locked_category: Option<CategoryId>,
) -> Result<ListingView> {
    let products = state.api().products().await?;
    let categories = state.api().categories().await?;
    let wishlist = load_wishlist(session).await;

    let filter = query.filter(locked_category);
    let sort = query.sort();

    let mut matching = filter.apply(products);
    sort.sort(&mut matching);
    let page = Page::paginate(matching, query.page(), state.config().products_per_page);

    let category_locked = locked_category.is_some();
    let prev_url = page
        .has_previous()
        .then(|| query.page_href(base_path, &filter, category_locked, page.previous_page()));
    let next_url = page
        .has_next()
        .then(|| query.page_href(base_path, &filter, category_locked, page.next_page()));

    Ok(ListingView {
        action: base_path.to_string(),
        products: ProductView::list(&page.items, &categories, &wishlist),
        categories: categories
            .iter()
            .map(|c| CategoryOption {
                id: c.id,
                name: c.name.clone(),
                selected: filter.category == Some(c.id),
            })
            .collect(),
        category_locked,
        sort_options: ProductSort::ALL
            .iter()
            .map(|s| SortOption {
                value: s.as_str(),
                label: s.label(),
                selected: *s == sort,
            })
            .collect(),
        q: filter.search.clone().unwrap_or_default(),
        min_price: filter.min_price.map(|d| d.to_string()).unwrap_or_default(),
        max_price: filter.max_price.map(|d| d.to_string()).unwrap_or_default(),
        in_stock: filter.in_stock_only,
        filters_active: filter.is_active() && !(category_locked && only_category(&filter)),
        current_page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        first_item: page.first_item_number(),
        last_item: page.last_item_number(),
        prev_url,
        next_url,
    })
}

/// Whether the category is the only thing narrowing the filter.
fn only_category(filter: &ProductFilter) -> bool {
    filter.search.is_none()
        && filter.min_price.is_none()
        && filter.max_price.is_none()
        && !filter.in_stock_only
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub listing: ListingView,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductView,
    pub related_products: Vec<ProductView>,
    pub max_quantity: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display product listing page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let listing = build_listing(&state, &session, &query, "/products", None).await?;

    Ok(ProductsIndexTemplate {
        ctx: PageContext::load(&state, &session).await,
        listing,
    })
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ProductId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {id}")))?;

    let product = state.api().product(id).await?;
    if !product.status.is_visible() {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    let categories = state.api().categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories for product page");
        Vec::new()
    });
    let related = match product.category_id() {
        Some(category) => state
            .api()
            .products()
            .await
            .map(|products| {
                ProductFilter {
                    category: Some(category),
                    ..ProductFilter::storefront()
                }
                .apply(products)
                .into_iter()
                .filter(|p| p.id != product.id)
                .take(RELATED_PRODUCTS)
                .collect::<Vec<_>>()
            })
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load related products");
                Vec::new()
            }),
        None => Vec::new(),
    };

    let wishlist = load_wishlist(&session).await;
    let max_quantity = product.stock.min(MAX_LINE_QUANTITY);

    Ok(ProductShowTemplate {
        ctx: PageContext::load(&state, &session).await,
        product: ProductView::build(&product, &categories, &wishlist),
        related_products: ProductView::list(&related, &categories, &wishlist),
        max_quantity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn query(pairs: &[(&str, &str)]) -> ListingQuery {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        let uri: Uri = format!("/products?{encoded}").parse().unwrap();
        Query::<ListingQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_blank_and_invalid_fields_are_ignored() {
        let q = query(&[
            ("q", "  "),
            ("category", "abc"),
            ("min_price", ""),
            ("max_price", "-5"),
            ("page", "x"),
        ]);
        let filter = q.filter(None);
        assert!(!filter.is_active());
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn test_filter_from_query() {
        let q = query(&[
            ("q", "tote"),
            ("category", "2"),
            ("min_price", "10"),
            ("max_price", "99.50"),
            ("in_stock", "on"),
            ("sort", "price_desc"),
            ("page", "3"),
        ]);
        let filter = q.filter(None);
        assert_eq!(filter.search.as_deref(), Some("tote"));
        assert_eq!(filter.category, Some(CategoryId::new(2)));
        assert_eq!(filter.min_price, Some(Decimal::new(10, 0)));
        assert_eq!(filter.max_price, Some(Decimal::new(9950, 2)));
        assert!(filter.in_stock_only);
        assert_eq!(q.sort(), ProductSort::PriceDesc);
        assert_eq!(q.page(), 3);
    }

    #[test]
    fn test_locked_category_wins() {
        let q = query(&[("category", "2")]);
        assert_eq!(
            q.filter(Some(CategoryId::new(7))).category,
            Some(CategoryId::new(7))
        );
    }

    #[test]
    fn test_page_href_preserves_filters() {
        let q = query(&[("q", "wool scarf"), ("category", "2"), ("sort", "name")]);
        let filter = q.filter(None);
        assert_eq!(
            q.page_href("/products", &filter, false, 2),
            "/products?q=wool+scarf&category=2&sort=name&page=2"
        );
        assert_eq!(
            q.page_href("/categories/2", &filter, true, 2),
            "/categories/2?q=wool+scarf&sort=name&page=2"
        );
    }

    #[test]
    fn test_product_view_prices() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Tote", "price": "15.00", "compareAtPrice": "20.00", "stock": 0
        }))
        .unwrap();
        let view = ProductView::from(&product);
        assert_eq!(view.price, "$15.00");
        assert_eq!(view.compare_at_price.as_deref(), Some("$20.00"));
        assert_eq!(view.discount_percent, Some(25));
        assert!(!view.in_stock);
    }
}
