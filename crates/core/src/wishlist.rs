//! Saved-for-later products.
//!
//! Unlike the cart, a wishlist has no quantities: a product is either on it
//! or not, and adding it twice is a no-op.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::models::Product;
use crate::types::{Price, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub price: Price,
}

impl From<&Product> for WishlistItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            price: product.unit_price(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    /// Add the product if it is not already saved. Returns `true` if added.
    pub fn add(&mut self, product: &Product) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.items.push(WishlistItem::from(product));
        true
    }

    /// Remove the product. Returns `true` if it was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Move a saved product into the cart as one unit.
    ///
    /// `product` is the current catalog record, so the cart line carries
    /// today's name and price rather than what was cached when it was saved.
    /// Returns the line's new quantity, or `None` if the product was not on
    /// the wishlist.
    pub fn move_to_cart(&mut self, product: &Product, cart: &mut Cart) -> Option<u32> {
        if !self.remove(product.id) {
            return None;
        }
        Some(cart.add(product, 1))
    }
}
