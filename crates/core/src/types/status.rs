//! Status enums for various entities.
//!
//! The backend sends these as lowercase strings. Each enum knows its display
//! label and the badge classes the dashboards use to render it.

use serde::{Deserialize, Serialize};

/// Catalog visibility of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Visible in the storefront.
    #[default]
    Active,
    /// Being edited, hidden from the storefront.
    Draft,
    /// Retired, hidden from the storefront.
    Archived,
}

impl ProductStatus {
    /// All statuses, in the order filters list them.
    pub const ALL: [Self; 3] = [Self::Active, Self::Draft, Self::Archived];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Draft => "Draft",
            Self::Archived => "Archived",
        }
    }

    /// Badge classes for list views.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Active => "bg-green-100 text-green-700",
            Self::Draft => "bg-yellow-100 text-yellow-700",
            Self::Archived => "bg-gray-100 text-gray-700",
        }
    }

    /// Whether shoppers can see the product.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Draft => write!(f, "draft"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "draft" => Ok(Self::Draft),
            "archived" => Ok(Self::Archived),
            other => Err(format!("invalid product status: {other}")),
        }
    }
}

/// Order lifecycle status.
///
/// Values the backend adds later deserialize as [`OrderStatus::Unknown`]
/// instead of failing the whole order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses offered in filters (excludes `Unknown`).
    pub const FILTERABLE: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    /// Badge classes for list views.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Pending => "bg-yellow-100 text-yellow-700",
            Self::Processing => "bg-blue-100 text-blue-700",
            Self::Shipped => "bg-indigo-100 text-indigo-700",
            Self::Delivered => "bg-green-100 text-green-700",
            Self::Cancelled => "bg-red-100 text-red-700",
            Self::Unknown => "bg-gray-100 text-gray-700",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label().to_ascii_lowercase())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("invalid order status: {other}")),
        }
    }
}

/// Account role assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    #[serde(alias = "user", alias = "USER", alias = "CUSTOMER")]
    Customer,
    #[serde(alias = "ADMIN")]
    Admin,
}

impl UserRole {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Admin => "Admin",
        }
    }

    /// Badge classes for list views.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Customer => "bg-gray-100 text-gray-700",
            Self::Admin => "bg-purple-100 text-purple-700",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("invalid user role: {other}")),
        }
    }
}
