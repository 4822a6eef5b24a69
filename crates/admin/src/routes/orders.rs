//! Orders list route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use shopfront_core::{Order, OrderFilter, OrderId, OrderStatus, Page};
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{FilterOption, ListQuery, Pagination, format_date};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::AdminPage;
use crate::state::AppState;

/// Order row for the list table.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: OrderId,
    pub number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub item_count: u32,
    pub total: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub placed_on: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            number: order.display_number(),
            customer_name: order.customer_name(),
            customer_email: order.customer_email().unwrap_or_default().to_string(),
            item_count: order.item_count(),
            total: order.total_price().to_string(),
            status: order.status.label(),
            status_class: order.status.badge_class(),
            placed_on: format_date(order.created_at.as_ref()),
        }
    }
}

/// Orders list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub page: AdminPage,
    pub orders: Vec<OrderRow>,
    pub search: String,
    pub statuses: Vec<FilterOption>,
    pub pagination: Pagination,
}

/// Newest first; undated orders sink to the bottom.
fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Orders list page handler.
///
/// GET /orders
#[instrument(skip(admin, state, session, query), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let orders = state.api().admin_orders(&admin.token()).await?;

    let filter = OrderFilter {
        search: query.search(),
        status: query.status::<OrderStatus>(),
    };
    let mut matching = filter.apply(orders);
    newest_first(&mut matching);

    let listed = Page::paginate(matching, query.page(), state.config().page_size);
    let pagination = Pagination::new(&listed, "/orders", &query);

    Ok(OrdersIndexTemplate {
        page: AdminPage::load(&admin, &session, "/orders").await,
        orders: listed.items.iter().map(OrderRow::from).collect(),
        statuses: FilterOption::list(&OrderStatus::FILTERABLE, filter.status, OrderStatus::label),
        search: filter.search.unwrap_or_default(),
        pagination,
    })
}
