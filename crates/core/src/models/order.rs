//! Orders as listed by `GET /orders/admin/all`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderStatus, Price, ProductId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default, alias = "user")]
    pub customer: Option<OrderCustomer>,
    #[serde(alias = "totalAmount", alias = "totalPrice")]
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Order number as shown to staff ("#1042").
    #[must_use]
    pub fn display_number(&self) -> String {
        match self.order_number.as_deref() {
            Some(n) if n.starts_with('#') => n.to_string(),
            Some(n) if !n.is_empty() => format!("#{n}"),
            _ => format!("#{}", self.id),
        }
    }

    /// Customer display name, falling back to email then "Guest".
    #[must_use]
    pub fn customer_name(&self) -> String {
        self.customer
            .as_ref()
            .and_then(|c| {
                c.name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .or(c.email.as_deref())
            })
            .unwrap_or("Guest")
            .to_string()
    }

    #[must_use]
    pub fn customer_email(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.email.as_deref())
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::usd(self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub price: Decimal,
}

const fn one() -> u32 {
    1
}
