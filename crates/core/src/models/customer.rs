//! Customer accounts as listed by `GET /users/admin/all`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{UserId, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: UserId,
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, alias = "ordersCount")]
    pub order_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Name for list views; the email's local part stands in when unnamed.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.email.split('@').next().unwrap_or(&self.email))
    }
}
