//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//!
//! # Dashboard
//! GET  /                        - Analytics overview
//!
//! # Auth (backend credentials, admin role only)
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action
//! POST /auth/logout             - Logout
//!
//! # Products
//! GET  /products                - Product listing (q, status, page)
//! GET  /products/new            - New product form
//! POST /products                - Create product
//! GET  /products/{id}/edit      - Edit product form
//! POST /products/{id}           - Update product
//! POST /products/{id}/delete    - Delete product
//!
//! # Categories
//! GET  /categories              - Category listing (q, page)
//! GET  /categories/new          - New category form
//! POST /categories              - Create category
//! GET  /categories/{id}/edit    - Edit category form
//! POST /categories/{id}         - Update category
//! POST /categories/{id}/delete  - Delete category
//!
//! # Orders and customers (read-only)
//! GET  /orders                  - Order listing (q, status, page)
//! GET  /customers               - Customer listing (q, role, page)
//!
//! # Theme
//! GET  /theme                   - Theme editor
//! POST /theme                   - Save theme
//! POST /theme/reset             - Restore a preset (default when none given)
//! GET  /theme/preview.css       - Stylesheet for unsaved tokens
//!
//! # Diagnostics
//! GET  /diagnostics             - Probe every backend read endpoint
//! ```

pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod diagnostics;
pub mod orders;
pub mod products;
pub mod theme;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::flash::{self, Flash};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.display_name().to_string(),
            email: admin.email.clone(),
        }
    }
}

/// Layout data shared by every signed-in page.
pub struct AdminPage {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
}

impl AdminPage {
    /// Gather layout data. Consumes pending notices.
    pub async fn load(admin: &CurrentAdmin, session: &Session, current_path: &str) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: current_path.to_string(),
            flashes: flash::take(session).await,
        }
    }

    /// Whether the sidebar entry for `section` should be highlighted.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        if section == "/" {
            self.current_path == "/"
        } else {
            self.current_path == section
                || self
                    .current_path
                    .strip_prefix(section)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
    }
}

/// Field-level validation messages for a form.
#[derive(Debug, Clone, Default)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| message.as_str())
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

/// Treat blank form inputs as absent.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit))
        .route("/{id}/delete", post(products::delete))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/new", get(categories::new))
        .route("/{id}", post(categories::update))
        .route("/{id}/edit", get(categories::edit))
        .route("/{id}/delete", post(categories::delete))
}

/// Create the theme routes router.
pub fn theme_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(theme::edit).post(theme::save))
        .route("/reset", post(theme::reset))
        .route("/preview.css", get(theme::preview))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .route("/orders", get(orders::index))
        .route("/customers", get(customers::index))
        .nest("/theme", theme_routes())
        .route("/diagnostics", get(diagnostics::index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str) -> AdminPage {
        AdminPage {
            admin_user: AdminUserView {
                name: "Ops".to_string(),
                email: "ops@example.com".to_string(),
            },
            current_path: path.to_string(),
            flashes: Vec::new(),
        }
    }

    #[test]
    fn test_is_active_matches_section_prefix() {
        assert!(page("/products/4/edit").is_active("/products"));
        assert!(page("/products").is_active("/products"));
        assert!(!page("/products-archive").is_active("/products"));
        assert!(page("/").is_active("/"));
        assert!(!page("/orders").is_active("/"));
    }

    #[test]
    fn test_field_errors_lookup() {
        let mut errors = FieldErrors::default();
        assert!(errors.is_empty());
        errors.add("price", "Price must be zero or more");
        assert!(errors.has("price"));
        assert_eq!(errors.get("price"), Some("Price must be zero or more"));
        assert_eq!(errors.get("name"), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" Mugs "), Some("Mugs".to_string()));
    }
}
