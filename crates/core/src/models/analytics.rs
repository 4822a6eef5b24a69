//! Dashboard figures from `GET /analytics/dashboard`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::Order;
use crate::types::Price;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardAnalytics {
    #[serde(alias = "revenue")]
    pub total_revenue: Decimal,
    pub total_orders: u64,
    #[serde(alias = "totalUsers")]
    pub total_customers: u64,
    pub total_products: u64,
    pub recent_orders: Vec<Order>,
    #[serde(alias = "salesByMonth", alias = "monthlyRevenue")]
    pub revenue_by_month: Vec<RevenuePoint>,
}

impl DashboardAnalytics {
    /// Revenue divided by order count; zero when there are no orders.
    #[must_use]
    pub fn average_order_value(&self) -> Price {
        if self.total_orders == 0 {
            return Price::default();
        }
        Price::usd(self.total_revenue / Decimal::from(self.total_orders))
    }

    /// Largest monthly revenue, used to scale the chart bars.
    #[must_use]
    pub fn peak_monthly_revenue(&self) -> Decimal {
        self.revenue_by_month
            .iter()
            .map(|p| p.revenue)
            .max()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    #[serde(alias = "month")]
    pub label: String,
    #[serde(alias = "total", alias = "sales")]
    pub revenue: Decimal,
}
