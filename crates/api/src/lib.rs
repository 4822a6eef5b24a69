//! Shopfront API - REST client for the commerce backend.
//!
//! The backend owns products, categories, orders, users, analytics and
//! authentication. This crate is a thin typed layer over its JSON endpoints:
//!
//! ```text
//! POST   /auth/login             POST   /auth/register
//! GET    /products               GET    /products/{id}
//! POST   /products               PATCH  /products/{id}     DELETE /products/{id}
//! GET    /categories             GET    /categories/{id}
//! POST   /categories             PATCH  /categories/{id}   DELETE /categories/{id}
//! GET    /users/admin/all        GET    /orders/admin/all
//! GET    /analytics/dashboard    GET    /health
//! ```
//!
//! Requests are sent once: there are no retries, no backoff and no
//! idempotency keys. Failures surface as [`ApiError`], whose
//! [`ApiError::user_message`] is what the UI shows in a toast.
//!
//! Catalog reads are cached in memory via `moka`; mutations made through the
//! same client invalidate the affected entries.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_api::{ApiClient, ApiClientConfig};
//!
//! let client = ApiClient::new(&ApiClientConfig::new(base_url));
//! let products = client.products().await?;
//! let session = client.login(&LoginRequest { email, password }).await?;
//! let orders = client.admin_orders(&session_token).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod admin;
mod auth;
mod cache;
mod catalog;
mod client;
mod diagnostics;
mod error;

pub use client::{ApiClient, ApiClientConfig};
pub use diagnostics::{DiagnosticEndpoint, ProbeOutcome, ProbeResult, diagnostics_endpoints};
pub use error::ApiError;
