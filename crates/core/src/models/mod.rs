//! Records exchanged with the commerce backend.
//!
//! The backend speaks camelCase JSON and is loose about optional fields, so
//! every record here tolerates missing or `null` optional values. Aliases
//! cover the field spellings seen across backend versions.

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod customer;
pub mod health;
pub mod order;

pub use analytics::{DashboardAnalytics, RevenuePoint};
pub use auth::{AuthSession, AuthUser, LoginRequest, RegisterRequest};
pub use catalog::{Category, CategoryInput, CategoryRef, Product, ProductInput, slugify};
pub use customer::Customer;
pub use health::HealthStatus;
pub use order::{Order, OrderCustomer, OrderLine};
