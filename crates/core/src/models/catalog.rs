//! Products and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, ProductStatus};

/// A product as returned by `GET /products` and `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default, alias = "originalPrice")]
    pub compare_at_price: Option<Decimal>,
    #[serde(default, alias = "stockQuantity", alias = "quantity")]
    pub stock: u32,
    #[serde(default, alias = "image", alias = "thumbnail")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Unit price in the store currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Category id, whether sent flat or as an embedded reference.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
            .or_else(|| self.category.as_ref().map(|c| c.id))
    }

    /// Category name when the backend embedded one.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether a higher compare-at price is set.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price.is_some_and(|was| was > self.price)
    }

    /// Whole-percent discount against the compare-at price.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let was = self.compare_at_price.filter(|was| *was > self.price)?;
        let pct = ((was - self.price) / was * Decimal::ONE_HUNDRED).round();
        u32::try_from(pct.mantissa()).ok()
    }
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A category as returned by `GET /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /products` and `PATCH /products/{id}`.
///
/// Every field is sent. An empty optional goes out as `null`, which is how a
/// PATCH clears it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub compare_at_price: Option<Decimal>,
    pub stock: u32,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub status: ProductStatus,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            compare_at_price: product.compare_at_price,
            stock: product.stock,
            image_url: product.image_url.clone(),
            category_id: product.category_id(),
            status: product.status,
        }
    }
}

/// Body for `POST /categories` and `PATCH /categories/{id}`.
///
/// A missing slug is left to the backend; empty description and image go out
/// as `null` so an edit can clear them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Category> for CategoryInput {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone(),
        }
    }
}

/// Derive a URL slug from a display name ("Summer Sale!" -> "summer-sale").
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
