//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `storefront` - Public-facing shop (browsing, cart, wishlist, checkout)
//! - `admin` - Administration dashboard (catalog CRUD, orders, theming)
//! - `api` - REST client for the external commerce backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`models`] - Records exchanged with the backend
//! - [`listing`] - Filtering, sorting and pagination of record lists
//! - [`cart`] - Shopping cart state container and checkout totals
//! - [`wishlist`] - Saved-for-later product list
//! - [`theme`] - Theme tokens and their CSS custom property projection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod listing;
pub mod models;
pub mod theme;
pub mod types;
pub mod wishlist;

pub use cart::{Cart, CartError, CartItem, CheckoutSummary, ShippingPolicy};
pub use listing::{CustomerFilter, OrderFilter, Page, ProductFilter, ProductSort};
pub use models::*;
pub use theme::{ThemeConfig, ThemeError, ThemeStylesheet};
pub use types::*;
pub use wishlist::{Wishlist, WishlistItem};
