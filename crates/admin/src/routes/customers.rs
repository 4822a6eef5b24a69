//! Customers list route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use shopfront_core::{Customer, CustomerFilter, Page, UserId, UserRole};
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{FilterOption, ListQuery, Pagination, format_date};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::AdminPage;
use crate::state::AppState;

const ROLES: [UserRole; 2] = [UserRole::Customer, UserRole::Admin];

/// Customer row for the list table.
#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub role_class: &'static str,
    pub order_count: String,
    pub joined_on: String,
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.display_name().to_string(),
            email: customer.email.clone(),
            role: customer.role.label(),
            role_class: customer.role.badge_class(),
            order_count: customer
                .order_count
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
            joined_on: format_date(customer.created_at.as_ref()),
        }
    }
}

/// Customers list template.
#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub page: AdminPage,
    pub customers: Vec<CustomerRow>,
    pub search: String,
    pub roles: Vec<FilterOption>,
    pub pagination: Pagination,
}

/// Customers list page handler.
///
/// GET /customers
#[instrument(skip(admin, state, session, query), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let customers = state.api().admin_customers(&admin.token()).await?;

    let filter = CustomerFilter {
        search: query.search(),
        role: query.role::<UserRole>(),
    };
    let listed = Page::paginate(
        filter.apply(customers),
        query.page(),
        state.config().page_size,
    );
    let pagination = Pagination::new(&listed, "/customers", &query);

    Ok(CustomersIndexTemplate {
        page: AdminPage::load(&admin, &session, "/customers").await,
        customers: listed.items.iter().map(CustomerRow::from).collect(),
        roles: FilterOption::list(&ROLES, filter.role, UserRole::label),
        search: filter.search.unwrap_or_default(),
        pagination,
    })
}
