//! Shopping cart state container.
//!
//! A [`Cart`] is a list of lines keyed by product id. All mutations are
//! synchronous and leave the cart consistent:
//!
//! - at most one line per product id (adding an existing product increments it)
//! - every line has a quantity between 1 and [`MAX_LINE_QUANTITY`]
//! - a line total is always `unit_price * quantity`
//! - the subtotal is always the sum of the line totals
//!
//! Totals are derived on read rather than cached, so there is nothing to
//! recompute after a mutation. The cart serializes as plain JSON and lives in
//! the visitor session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Product;
use crate::types::{Price, ProductId};

/// Upper bound for a single line's quantity.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Errors from cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No line exists for the product.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),
}

/// One cart line: a product snapshot plus quantity.
///
/// Name, image and price are cached from the product at the time it was
/// added so the cart renders without refetching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// Build a line for `product` with the given quantity (clamped to 1..=max).
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            unit_price: product.unit_price(),
            quantity: quantity.clamp(1, MAX_LINE_QUANTITY),
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }
}

/// The cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities (what the header badge shows).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add `quantity` units of `product`.
    ///
    /// If the product already has a line its quantity is incremented (and the
    /// cached name, image and price are refreshed); otherwise a new line is
    /// appended. A zero quantity adds one unit. Returns the line's new quantity.
    pub fn add(&mut self, product: &Product, quantity: u32) -> u32 {
        self.add_item(CartItem::from_product(product, quantity))
    }

    /// Merge a prepared line into the cart, with the same rules as [`Cart::add`].
    pub fn add_item(&mut self, item: CartItem) -> u32 {
        let quantity = item.quantity.max(1);
        if let Some(existing) = self.line_mut(item.product_id) {
            existing.quantity = existing
                .quantity
                .saturating_add(quantity)
                .min(MAX_LINE_QUANTITY);
            existing.name = item.name;
            existing.image_url = item.image_url;
            existing.unit_price = item.unit_price;
            return existing.quantity;
        }
        let quantity = quantity.min(MAX_LINE_QUANTITY);
        self.items.push(CartItem { quantity, ..item });
        quantity
    }

    /// Increment a line by one. Returns the new quantity.
    pub fn increase(&mut self, product_id: ProductId) -> Result<u32, CartError> {
        let item = self
            .line_mut(product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;
        item.quantity = (item.quantity + 1).min(MAX_LINE_QUANTITY);
        Ok(item.quantity)
    }

    /// Decrement a line by one; a line at quantity 1 is removed.
    ///
    /// Returns the new quantity (0 when the line was removed).
    pub fn decrease(&mut self, product_id: ProductId) -> Result<u32, CartError> {
        let current = self
            .get(product_id)
            .map(|i| i.quantity)
            .ok_or(CartError::ItemNotFound(product_id))?;
        self.set_quantity(product_id, current.saturating_sub(1))
    }

    /// Set a line's quantity; 0 removes the line. Quantities above the
    /// maximum are clamped. Returns the stored quantity.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            self.remove(product_id)?;
            return Ok(0);
        }
        let item = self
            .line_mut(product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;
        item.quantity = quantity.min(MAX_LINE_QUANTITY);
        Ok(item.quantity)
    }

    /// Remove a line, returning it.
    pub fn remove(&mut self, product_id: ProductId) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;
        Ok(self.items.remove(index))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Cap the product's line at its stock level.
    ///
    /// Returns the new quantity when the line held more than is available,
    /// `None` when it already fit or is not in the cart.
    pub fn limit_to_stock(&mut self, product: &Product) -> Option<u32> {
        let held = self.get(product.id)?.quantity;
        if held <= product.stock {
            return None;
        }
        self.set_quantity(product.id, product.stock).ok()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }
}

/// Shipping charges applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Charged when the subtotal is below the threshold.
    pub flat_rate: Decimal,
    /// Subtotal at or above which shipping is free.
    pub free_threshold: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_rate: Decimal::new(599, 2),
            free_threshold: Decimal::new(50, 0),
        }
    }
}

impl ShippingPolicy {
    /// Shipping owed for a subtotal. An empty cart ships for free.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Price) -> Price {
        if subtotal.is_zero() || subtotal.amount >= self.free_threshold {
            Price::zero(subtotal.currency_code)
        } else {
            Price::new(self.flat_rate, subtotal.currency_code)
        }
    }

    /// How much more the shopper must spend for free shipping, if anything.
    #[must_use]
    pub fn remaining_for_free_shipping(&self, subtotal: Price) -> Option<Price> {
        (!subtotal.is_zero() && subtotal.amount < self.free_threshold).then(|| {
            Price::new(self.free_threshold - subtotal.amount, subtotal.currency_code)
        })
    }
}

/// Order totals shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub item_count: u32,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub free_shipping_remaining: Option<Price>,
}

impl CheckoutSummary {
    #[must_use]
    pub fn new(cart: &Cart, policy: &ShippingPolicy) -> Self {
        let subtotal = cart.subtotal();
        let shipping = policy.shipping_for(subtotal);
        Self {
            item_count: cart.item_count(),
            subtotal,
            shipping,
            total: subtotal + shipping,
            free_shipping_remaining: policy.remaining_for_free_shipping(subtotal),
        }
    }
}
