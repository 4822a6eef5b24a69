//! Category management route handlers.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::{Category, CategoryId, CategoryInput, Page, slugify};
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use crate::components::{ListQuery, Pagination, format_date};
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::routes::{AdminPage, FieldErrors, non_empty};
use crate::state::AppState;

/// Category row for the list table.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub product_count: usize,
    pub created_on: String,
}

/// Categories list template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub page: AdminPage,
    pub categories: Vec<CategoryRow>,
    pub search: String,
    pub pagination: Pagination,
}

fn matches_search(category: &Category, search: &str) -> bool {
    let needle = search.to_lowercase();
    category.name.to_lowercase().contains(&needle)
        || category
            .slug
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&needle))
}

/// Categories list page handler.
///
/// GET /categories
#[instrument(skip(admin, state, session, query), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let (categories, products) = tokio::join!(state.api().categories(), state.api().products());
    let categories = categories?;

    // Counts are a nicety; the list still renders without them.
    let mut counts: HashMap<CategoryId, usize> = HashMap::new();
    match products {
        Ok(products) => {
            for id in products.iter().filter_map(shopfront_core::Product::category_id) {
                *counts.entry(id).or_default() += 1;
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not load products for category counts"),
    }

    let search = query.search();
    let filtered: Vec<Category> = categories
        .into_iter()
        .filter(|c| search.as_deref().is_none_or(|q| matches_search(c, q)))
        .collect();
    let listed = Page::paginate(filtered, query.page(), state.config().page_size);
    let pagination = Pagination::new(&listed, "/categories", &query);

    let rows = listed
        .items
        .iter()
        .map(|c| CategoryRow {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone().unwrap_or_else(|| slugify(&c.name)),
            description: c.description.clone().unwrap_or_default(),
            product_count: counts.get(&c.id).copied().unwrap_or(0),
            created_on: format_date(c.created_at.as_ref()),
        })
        .collect();

    Ok(CategoriesIndexTemplate {
        page: AdminPage::load(&admin, &session, "/categories").await,
        categories: rows,
        search: search.unwrap_or_default(),
        pagination,
    })
}

/// Category form data, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: String,
}

impl CategoryForm {
    fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone().unwrap_or_default(),
            description: category.description.clone().unwrap_or_default(),
            image_url: category.image_url.clone().unwrap_or_default(),
        }
    }

    /// Validate the submission and build the backend payload.
    ///
    /// A blank slug is derived from the name.
    pub fn parse(&self) -> std::result::Result<CategoryInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let slug = match non_empty(&self.slug) {
            Some(slug) if slugify(&slug) != slug => {
                errors.add(
                    "slug",
                    "Slug may only contain lowercase letters, digits and dashes",
                );
                None
            }
            Some(slug) => Some(slug),
            None => Some(slugify(name)).filter(|s| !s.is_empty()),
        };
        if slug.is_none() && !name.is_empty() && !errors.has("slug") {
            errors.add("slug", "Enter a slug; none could be made from the name");
        }

        let image_url = non_empty(&self.image_url);
        if let Some(raw) = &image_url
            && !Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
        {
            errors.add("image_url", "Image URL must start with http:// or https://");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CategoryInput {
            name: name.to_string(),
            slug,
            description: non_empty(&self.description),
            image_url,
        })
    }
}

/// New/edit category form template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub page: AdminPage,
    pub title: String,
    pub action: String,
    pub is_new: bool,
    pub form: CategoryForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

async fn render_form(
    admin: &CurrentAdmin,
    session: &Session,
    id: Option<CategoryId>,
    form: CategoryForm,
    errors: FieldErrors,
    error: Option<String>,
) -> Response {
    let (title, action) = match id {
        Some(id) => (format!("Edit category #{id}"), format!("/categories/{id}")),
        None => ("New category".to_string(), "/categories".to_string()),
    };

    CategoryFormTemplate {
        page: AdminPage::load(admin, session, "/categories").await,
        title,
        action,
        is_new: id.is_none(),
        form,
        errors,
        error,
    }
    .into_response()
}

fn parse_id(raw: &str) -> Result<CategoryId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("category {raw}")))
}

/// New category form.
///
/// GET /categories/new
pub async fn new(RequireAdminAuth(admin): RequireAdminAuth, session: Session) -> Response {
    render_form(
        &admin,
        &session,
        None,
        CategoryForm::default(),
        FieldErrors::default(),
        None,
    )
    .await
}

/// Create a category.
///
/// POST /categories
#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(errors) => return Ok(render_form(&admin, &session, None, form, errors, None).await),
    };

    match state.api().create_category(&admin.token(), &input).await {
        Ok(category) => {
            flash::success(&session, format!("Created \"{}\"", category.name)).await;
            Ok(Redirect::to("/categories").into_response())
        }
        Err(e) if e.is_client_error() && !e.is_unauthorized() => {
            let message = e.user_message();
            Ok(render_form(&admin, &session, None, form, FieldErrors::default(), Some(message)).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Edit category form.
///
/// GET /categories/{id}/edit
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let category = state.api().category(id).await?;

    Ok(render_form(
        &admin,
        &session,
        Some(id),
        CategoryForm::from_category(&category),
        FieldErrors::default(),
        None,
    )
    .await)
}

/// Update a category.
///
/// POST /categories/{id}
#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let input = match form.parse() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(render_form(&admin, &session, Some(id), form, errors, None).await);
        }
    };

    match state.api().update_category(&admin.token(), id, &input).await {
        Ok(category) => {
            flash::success(&session, format!("Saved \"{}\"", category.name)).await;
            Ok(Redirect::to("/categories").into_response())
        }
        Err(e) if e.is_client_error() && !e.is_unauthorized() && !e.is_not_found() => {
            let message = e.user_message();
            Ok(render_form(
                &admin,
                &session,
                Some(id),
                form,
                FieldErrors::default(),
                Some(message),
            )
            .await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a category.
///
/// POST /categories/{id}/delete
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;

    match state.api().delete_category(&admin.token(), id).await {
        Ok(()) => flash::success(&session, "Category deleted").await,
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, category_id = %id, "Category delete failed");
            flash::error(&session, e.user_message()).await;
        }
    }

    Ok(Redirect::to("/categories"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, slug: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_string(),
            slug: slug.to_string(),
            ..CategoryForm::default()
        }
    }

    #[test]
    fn test_blank_slug_is_derived_from_name() {
        let input = form("Home & Garden", "").parse().unwrap();
        assert_eq!(input.slug.as_deref(), Some("home-garden"));
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_explicit_slug_must_be_clean() {
        let errors = form("Home", "Home Stuff").parse().unwrap_err();
        assert!(errors.has("slug"));
        assert!(!errors.has("name"));

        let input = form("Home", "home-stuff").parse().unwrap();
        assert_eq!(input.slug.as_deref(), Some("home-stuff"));
    }

    #[test]
    fn test_name_is_required() {
        let errors = form("  ", "").parse().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert!(!errors.has("slug"));
    }

    #[test]
    fn test_unsluggable_name_needs_explicit_slug() {
        let errors = form("***", "").parse().unwrap_err();
        assert!(errors.has("slug"));
    }

    #[test]
    fn test_search_matches_name_or_slug() {
        let category: Category = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Outdoor", "slug": "garden-tools"
        }))
        .unwrap();
        assert!(matches_search(&category, "OUT"));
        assert!(matches_search(&category, "garden"));
        assert!(!matches_search(&category, "kitchen"));
    }
}
