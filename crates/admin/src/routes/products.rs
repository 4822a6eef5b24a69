//! Product management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shopfront_api::ApiError;
use shopfront_core::{
    Category, CategoryId, Page, Product, ProductFilter, ProductId, ProductInput, ProductStatus,
};
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use crate::components::{FilterOption, ListQuery, Pagination, format_date};
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::routes::{AdminPage, FieldErrors, non_empty};
use crate::state::AppState;

// =============================================================================
// List
// =============================================================================

/// Product row for the list table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub category: String,
    pub price: String,
    pub stock: u32,
    pub status: &'static str,
    pub status_class: &'static str,
    pub created_on: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            category: product.category_name().unwrap_or("-").to_string(),
            price: product.unit_price().to_string(),
            stock: product.stock,
            status: product.status.label(),
            status_class: product.status.badge_class(),
            created_on: format_date(product.created_at.as_ref()),
        }
    }
}

/// Products list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: AdminPage,
    pub products: Vec<ProductRow>,
    pub search: String,
    pub statuses: Vec<FilterOption>,
    pub pagination: Pagination,
}

/// Products list page handler.
///
/// GET /products
#[instrument(skip(admin, state, session, query), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let products = state.api().products().await?;

    let status = query.status::<ProductStatus>();
    let filter = ProductFilter {
        search: query.search(),
        status,
        ..ProductFilter::default()
    };
    let listed = Page::paginate(
        filter.apply(products),
        query.page(),
        state.config().page_size,
    );
    let pagination = Pagination::new(&listed, "/products", &query);

    Ok(ProductsIndexTemplate {
        page: AdminPage::load(&admin, &session, "/products").await,
        products: listed.items.iter().map(ProductRow::from).collect(),
        search: filter.search.unwrap_or_default(),
        statuses: FilterOption::list(&ProductStatus::ALL, status, ProductStatus::label),
        pagination,
    })
}

// =============================================================================
// Form
// =============================================================================

/// Product form data, as submitted.
///
/// Numbers stay strings until [`ProductForm::parse`] so a bad value can be
/// echoed back in the form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: String,
    pub stock: String,
    pub image_url: String,
    pub category_id: String,
    pub status: String,
}

impl ProductForm {
    fn blank() -> Self {
        Self {
            price: "0.00".to_string(),
            stock: "0".to_string(),
            status: ProductStatus::Draft.to_string(),
            ..Self::default()
        }
    }

    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            compare_at_price: product
                .compare_at_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
            category_id: product
                .category_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            status: product.status.to_string(),
        }
    }

    /// Validate the submission and build the backend payload.
    pub fn parse(&self) -> std::result::Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let price = match self.price.trim().parse::<Decimal>() {
            Ok(price) if price.is_sign_negative() => {
                errors.add("price", "Price must be zero or more");
                None
            }
            Ok(price) => Some(price),
            Err(_) => {
                errors.add("price", "Price must be a number");
                None
            }
        };

        let compare_at_price = match non_empty(&self.compare_at_price) {
            None => None,
            Some(raw) => match raw.parse::<Decimal>() {
                Ok(value) if !value.is_sign_negative() => Some(value),
                _ => {
                    errors.add("compare_at_price", "Compare-at price must be zero or more");
                    None
                }
            },
        };

        let stock = match self.stock.trim().parse::<u32>() {
            Ok(stock) => Some(stock),
            Err(_) => {
                errors.add("stock", "Stock must be a whole number of zero or more");
                None
            }
        };

        let image_url = non_empty(&self.image_url);
        if let Some(raw) = &image_url
            && !Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
        {
            errors.add("image_url", "Image URL must start with http:// or https://");
        }

        let category_id = match non_empty(&self.category_id) {
            None => None,
            Some(raw) => {
                let parsed = raw.parse::<CategoryId>().ok();
                if parsed.is_none() {
                    errors.add("category_id", "Pick a category from the list");
                }
                parsed
            }
        };

        let status = self.status.parse::<ProductStatus>().unwrap_or_else(|_| {
            errors.add("status", "Pick a status from the list");
            ProductStatus::Draft
        });

        match (price, stock) {
            (Some(price), Some(stock)) if errors.is_empty() => Ok(ProductInput {
                name: name.to_string(),
                description: non_empty(&self.description),
                price,
                compare_at_price,
                stock,
                image_url,
                category_id,
                status,
            }),
            _ => Err(errors),
        }
    }
}

/// New/edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: AdminPage,
    pub title: String,
    pub action: String,
    pub is_new: bool,
    pub form: ProductForm,
    pub errors: FieldErrors,
    /// Backend rejection shown above the form.
    pub error: Option<String>,
    pub categories: Vec<FilterOption>,
    pub statuses: Vec<FilterOption>,
}

/// Which product a form is for.
enum FormTarget {
    New,
    Existing(ProductId),
}

impl FormTarget {
    fn title(&self) -> String {
        match self {
            Self::New => "New product".to_string(),
            Self::Existing(id) => format!("Edit product #{id}"),
        }
    }

    fn action(&self) -> String {
        match self {
            Self::New => "/products".to_string(),
            Self::Existing(id) => format!("/products/{id}"),
        }
    }
}

fn category_options(categories: &[Category], selected: &str) -> Vec<FilterOption> {
    categories
        .iter()
        .map(|c| {
            let value = c.id.to_string();
            FilterOption {
                selected: value == selected.trim(),
                label: c.name.clone(),
                value,
            }
        })
        .collect()
}

async fn render_form(
    state: &AppState,
    admin: &CurrentAdmin,
    session: &Session,
    target: &FormTarget,
    form: ProductForm,
    errors: FieldErrors,
    error: Option<String>,
) -> Result<Response> {
    let categories = state.api().categories().await?;
    let status = form.status.parse::<ProductStatus>().ok();

    Ok(ProductFormTemplate {
        page: AdminPage::load(admin, session, "/products").await,
        title: target.title(),
        action: target.action(),
        is_new: matches!(target, FormTarget::New),
        categories: category_options(&categories, &form.category_id),
        statuses: FilterOption::list(&ProductStatus::ALL, status, ProductStatus::label),
        form,
        errors,
        error,
    }
    .into_response())
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("product {raw}")))
}

/// A backend rejection worth showing next to the form rather than as an
/// error page.
fn form_rejection(error: &ApiError) -> Option<String> {
    (error.is_client_error() && !error.is_unauthorized()).then(|| error.user_message())
}

// =============================================================================
// Handlers
// =============================================================================

/// New product form.
///
/// GET /products/new
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    render_form(
        &state,
        &admin,
        &session,
        &FormTarget::New,
        ProductForm::blank(),
        FieldErrors::default(),
        None,
    )
    .await
}

/// Create a product.
///
/// POST /products
#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let target = FormTarget::New;
    let input = match form.parse() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &admin, &session, &target, form, errors, None).await;
        }
    };

    match state.api().create_product(&admin.token(), &input).await {
        Ok(product) => {
            flash::success(&session, format!("Created \"{}\"", product.name)).await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) => match form_rejection(&e) {
            Some(message) => {
                render_form(
                    &state,
                    &admin,
                    &session,
                    &target,
                    form,
                    FieldErrors::default(),
                    Some(message),
                )
                .await
            }
            None => Err(e.into()),
        },
    }
}

/// Edit product form.
///
/// GET /products/{id}/edit
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let product = state.api().product(id).await?;

    render_form(
        &state,
        &admin,
        &session,
        &FormTarget::Existing(id),
        ProductForm::from_product(&product),
        FieldErrors::default(),
        None,
    )
    .await
}

/// Update a product.
///
/// POST /products/{id}
#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let target = FormTarget::Existing(id);
    let input = match form.parse() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &admin, &session, &target, form, errors, None).await;
        }
    };

    match state.api().update_product(&admin.token(), id, &input).await {
        Ok(product) => {
            flash::success(&session, format!("Saved \"{}\"", product.name)).await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) if e.is_not_found() => Err(e.into()),
        Err(e) => match form_rejection(&e) {
            Some(message) => {
                render_form(
                    &state,
                    &admin,
                    &session,
                    &target,
                    form,
                    FieldErrors::default(),
                    Some(message),
                )
                .await
            }
            None => Err(e.into()),
        },
    }
}

/// Delete a product.
///
/// POST /products/{id}/delete
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;

    match state.api().delete_product(&admin.token(), id).await {
        Ok(()) => flash::success(&session, "Product deleted").await,
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Product delete failed");
            flash::error(&session, e.user_message()).await;
        }
    }

    Ok(Redirect::to("/products"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: " Canvas Tote ".to_string(),
            description: "  ".to_string(),
            price: "24.50".to_string(),
            compare_at_price: String::new(),
            stock: "12".to_string(),
            image_url: "https://cdn.example.com/tote.png".to_string(),
            category_id: "3".to_string(),
            status: "active".to_string(),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let input = form().parse().unwrap();
        assert_eq!(input.name, "Canvas Tote");
        assert_eq!(input.description, None);
        assert_eq!(input.price, Decimal::new(2450, 2));
        assert_eq!(input.stock, 12);
        assert_eq!(input.category_id, Some(CategoryId::new(3)));
        assert_eq!(input.status, ProductStatus::Active);
    }

    #[test]
    fn test_parse_reports_each_bad_field() {
        let bad = ProductForm {
            name: "   ".to_string(),
            price: "-1".to_string(),
            stock: "2.5".to_string(),
            image_url: "javascript:alert(1)".to_string(),
            ..form()
        };
        let errors = bad.parse().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("price"), Some("Price must be zero or more"));
        assert!(errors.has("stock"));
        assert!(errors.has("image_url"));
        assert!(!errors.has("category_id"));
    }

    #[test]
    fn test_parse_rejects_non_numeric_price_and_negative_stock() {
        let bad = ProductForm {
            price: "cheap".to_string(),
            stock: "-4".to_string(),
            ..form()
        };
        let errors = bad.parse().unwrap_err();
        assert_eq!(errors.get("price"), Some("Price must be a number"));
        assert!(errors.has("stock"));
    }

    #[test]
    fn test_blank_optional_fields_are_omitted() {
        let input = ProductForm {
            image_url: String::new(),
            category_id: " ".to_string(),
            ..form()
        }
        .parse()
        .unwrap();
        assert_eq!(input.image_url, None);
        assert_eq!(input.category_id, None);
    }

    #[test]
    fn test_category_options_mark_current() {
        let categories: Vec<Category> = serde_json::from_value(serde_json::json!([
            { "id": 1, "name": "Bags" },
            { "id": 3, "name": "Totes" }
        ]))
        .unwrap();
        let options = category_options(&categories, "3");
        assert!(!options.first().unwrap().selected);
        assert!(options.last().unwrap().selected);
    }
}
