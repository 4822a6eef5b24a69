//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shopfront_core::{DashboardAnalytics, Order, Price};
use tower_sessions::Session;
use tracing::instrument;

use crate::components::format_date;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::AdminPage;
use crate::state::AppState;

const RECENT_ORDER_LIMIT: usize = 5;

/// Headline numbers.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub revenue: String,
    pub orders: String,
    pub customers: String,
    pub products: String,
    pub average_order: String,
}

impl From<&DashboardAnalytics> for DashboardMetrics {
    fn from(analytics: &DashboardAnalytics) -> Self {
        Self {
            revenue: Price::usd(analytics.total_revenue).to_string(),
            orders: analytics.total_orders.to_string(),
            customers: analytics.total_customers.to_string(),
            products: analytics.total_products.to_string(),
            average_order: analytics.average_order_value().to_string(),
        }
    }
}

/// Recent order view for dashboard.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub number: String,
    pub customer_name: String,
    pub total: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub placed_on: String,
}

impl From<&Order> for RecentOrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: order.display_number(),
            customer_name: order.customer_name(),
            total: order.total_price().to_string(),
            status: order.status.label(),
            status_class: order.status.badge_class(),
            placed_on: format_date(order.created_at.as_ref()),
        }
    }
}

/// One bar of the monthly revenue chart.
#[derive(Debug, Clone)]
pub struct RevenueBar {
    pub label: String,
    pub amount: String,
    /// Height relative to the best month, 0-100.
    pub percent: u32,
}

/// Scale each month against the peak so the chart fills its box.
fn revenue_bars(analytics: &DashboardAnalytics) -> Vec<RevenueBar> {
    let peak = analytics.peak_monthly_revenue();
    analytics
        .revenue_by_month
        .iter()
        .map(|point| {
            let percent = if peak > Decimal::ZERO {
                (point.revenue.max(Decimal::ZERO) / peak * Decimal::ONE_HUNDRED)
                    .round()
                    .to_u32()
                    .unwrap_or(0)
            } else {
                0
            };
            RevenueBar {
                label: point.label.clone(),
                amount: Price::usd(point.revenue).to_string(),
                percent,
            }
        })
        .collect()
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: AdminPage,
    pub metrics: DashboardMetrics,
    pub recent_orders: Vec<RecentOrderView>,
    pub revenue: Vec<RevenueBar>,
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let analytics = state.api().dashboard_analytics(&admin.token()).await?;

    Ok(DashboardTemplate {
        page: AdminPage::load(&admin, &session, "/").await,
        metrics: DashboardMetrics::from(&analytics),
        recent_orders: analytics
            .recent_orders
            .iter()
            .take(RECENT_ORDER_LIMIT)
            .map(RecentOrderView::from)
            .collect(),
        revenue: revenue_bars(&analytics),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analytics() -> DashboardAnalytics {
        serde_json::from_value(json!({
            "totalRevenue": 1500,
            "totalOrders": 6,
            "totalCustomers": 4,
            "totalProducts": 12,
            "recentOrders": [],
            "revenueByMonth": [
                { "label": "Jan", "revenue": 250 },
                { "label": "Feb", "revenue": 1000 },
                { "label": "Mar", "revenue": 0 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_metrics_format_money() {
        let metrics = DashboardMetrics::from(&analytics());
        assert_eq!(metrics.revenue, "$1500.00");
        assert_eq!(metrics.average_order, "$250.00");
        assert_eq!(metrics.orders, "6");
    }

    #[test]
    fn test_revenue_bars_scale_to_peak() {
        let bars = revenue_bars(&analytics());
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].percent, 25);
        assert_eq!(bars[1].percent, 100);
        assert_eq!(bars[2].percent, 0);
        assert_eq!(bars[1].amount, "$1000.00");
    }
}
