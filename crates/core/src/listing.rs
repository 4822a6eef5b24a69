//! Filtering, sorting and pagination for record lists.
//!
//! The backend returns whole collections; narrowing them down for a view is
//! done here with plain predicates so storefront and admin agree on what a
//! search or filter means.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Customer, Order, Product};
use crate::types::{CategoryId, OrderStatus, ProductStatus, UserRole};

/// Case-insensitive substring match; an empty needle matches everything.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Normalize free-text input: trimmed, `None` when blank.
#[must_use]
pub fn normalize_search(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Products
// =============================================================================

/// Product list filter. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock_only: bool,
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// Filter for shopper-facing lists: only active products.
    #[must_use]
    pub fn storefront() -> Self {
        Self {
            status: Some(ProductStatus::Active),
            ..Self::default()
        }
    }

    /// Whether `product` passes every configured predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            let in_name = contains_ci(&product.name, search);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, search));
            if !in_name && !in_description {
                return false;
            }
        }
        if let Some(category) = self.category
            && product.category_id() != Some(category)
        {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.in_stock_only && !product.in_stock() {
            return false;
        }
        if let Some(status) = self.status
            && product.status != status
        {
            return false;
        }
        true
    }

    /// Keep the matching products, preserving order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }

    /// Whether any field narrows the list (used to show "clear filters").
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.search.is_some()
            || self.category.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.in_stock_only
    }
}

/// Sort order for product lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceAsc, Self::PriceDesc, Self::Name];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::Name => "Name",
        }
    }

    /// Parse a query-string value; unknown values fall back to the default.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| Some(s.as_str()) == value)
            .unwrap_or_default()
    }

    /// Sort in place. Stable, so equal keys keep backend order.
    pub fn sort(&self, products: &mut [Product]) {
        match self {
            // Records without a timestamp sort last; ties keep backend order.
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
            Self::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
            Self::Name => products.sort_by_key(|p| p.name.to_lowercase()),
        }
    }
}

// =============================================================================
// Orders and customers
// =============================================================================

/// Admin order list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Matches order number, customer name or customer email.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        self.search.as_deref().is_none_or(|q| {
            contains_ci(&order.display_number(), q)
                || contains_ci(&order.customer_name(), q)
                || order.customer_email().is_some_and(|e| contains_ci(e, q))
        })
    }

    #[must_use]
    pub fn apply(&self, orders: Vec<Order>) -> Vec<Order> {
        orders.into_iter().filter(|o| self.matches(o)).collect()
    }
}

/// Admin customer list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    /// Matches name or email.
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

impl CustomerFilter {
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(role) = self.role
            && customer.role != role
        {
            return false;
        }
        self.search.as_deref().is_none_or(|q| {
            contains_ci(customer.display_name(), q) || contains_ci(&customer.email, q)
        })
    }

    #[must_use]
    pub fn apply(&self, customers: Vec<Customer>) -> Vec<Customer> {
        customers.into_iter().filter(|c| self.matches(c)).collect()
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, clamped into range.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    /// Always at least 1.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice `items` into the requested page.
    ///
    /// Out-of-range page numbers are clamped to the first or last page and a
    /// zero `per_page` is treated as one.
    #[must_use]
    pub fn paginate(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);
        let items = items
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn previous_page(&self) -> usize {
        self.page.saturating_sub(1)
    }

    #[must_use]
    pub const fn next_page(&self) -> usize {
        self.page + 1
    }

    /// 1-based index of the first item on this page (0 for an empty list).
    #[must_use]
    pub const fn first_item_number(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page.
    #[must_use]
    pub const fn last_item_number(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            (self.page - 1) * self.per_page + self.items.len()
        }
    }

    /// Convert items while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: i32, name: &str, price: i64, stock: u32, category: i32) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "description": format!("{name} description"),
            "price": price,
            "stock": stock,
            "categoryId": category,
            "createdAt": format!("2024-01-{:02}T00:00:00Z", id),
        }))
        .unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Canvas Tote", 25, 3, 1),
            product(2, "Leather Wallet", 60, 0, 1),
            product(3, "Wool Scarf", 40, 8, 2),
            product(4, "Canvas Sneakers", 90, 1, 3),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let filter = ProductFilter {
            search: Some("CANVAS".to_string()),
            ..ProductFilter::default()
        };
        let names: Vec<_> = filter.apply(catalog()).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["Canvas Tote", "Canvas Sneakers"]);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let filter = ProductFilter {
            min_price: Some(Decimal::from(40)),
            max_price: Some(Decimal::from(60)),
            ..ProductFilter::default()
        };
        let ids: Vec<_> = filter.apply(catalog()).iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, [2, 3]);
    }

    #[test]
    fn test_category_and_stock_filters_combine() {
        let filter = ProductFilter {
            category: Some(CategoryId::new(1)),
            in_stock_only: true,
            ..ProductFilter::default()
        };
        let ids: Vec<_> = filter.apply(catalog()).iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, [1]);
        assert!(filter.is_active());
    }

    #[test]
    fn test_storefront_filter_hides_drafts() {
        let mut products = catalog();
        products[0].status = ProductStatus::Draft;
        let visible = ProductFilter::storefront().apply(products);
        assert_eq!(visible.len(), 3);
        assert!(!ProductFilter::storefront().is_active());
    }

    #[test]
    fn test_sorts() {
        let mut products = catalog();
        ProductSort::PriceDesc.sort(&mut products);
        assert_eq!(products[0].name, "Canvas Sneakers");

        ProductSort::Name.sort(&mut products);
        assert_eq!(products[0].name, "Canvas Sneakers");
        assert_eq!(products[3].name, "Wool Scarf");

        ProductSort::Newest.sort(&mut products);
        assert_eq!(products[0].id.as_i32(), 4);
    }

    #[test]
    fn test_sort_parse_falls_back() {
        assert_eq!(ProductSort::parse_or_default(Some("price_asc")), ProductSort::PriceAsc);
        assert_eq!(ProductSort::parse_or_default(Some("bogus")), ProductSort::Newest);
        assert_eq!(ProductSort::parse_or_default(None), ProductSort::Newest);
    }

    #[test]
    fn test_paginate_middle_page() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.first_item_number(), 11);
        assert_eq!(page.last_item_number(), 20);
    }

    #[test]
    fn test_paginate_clamps_out_of_range() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), 99, 10);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, (21..=25).collect::<Vec<_>>());
        assert!(!page.has_next());

        let page = Page::paginate((1..=5).collect::<Vec<_>>(), 0, 10);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_paginate_empty_list_has_one_page() {
        let page: Page<u8> = Page::paginate(Vec::new(), 3, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.first_item_number(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_order_filter() {
        let orders: Vec<Order> = serde_json::from_value(json!([
            { "id": 1, "total": 10, "status": "pending",
              "customer": { "name": "Ada", "email": "ada@example.com" } },
            { "id": 2, "total": 20, "status": "delivered",
              "customer": { "name": "Grace", "email": "grace@example.com" } }
        ]))
        .unwrap();

        let by_status = OrderFilter {
            status: Some(OrderStatus::Delivered),
            ..OrderFilter::default()
        };
        assert_eq!(by_status.apply(orders.clone()).len(), 1);

        let by_email = OrderFilter {
            search: Some("ADA@".to_string()),
            ..OrderFilter::default()
        };
        assert_eq!(by_email.apply(orders)[0].id.as_i32(), 1);
    }

    #[test]
    fn test_customer_filter() {
        let customers: Vec<Customer> = serde_json::from_value(json!([
            { "id": 1, "email": "ada@example.com", "name": "Ada", "role": "admin" },
            { "id": 2, "email": "bob@example.com", "name": "Bob" }
        ]))
        .unwrap();

        let admins = CustomerFilter {
            role: Some(UserRole::Admin),
            ..CustomerFilter::default()
        };
        assert_eq!(admins.apply(customers.clone()).len(), 1);

        let search = CustomerFilter {
            search: Some("bob".to_string()),
            ..CustomerFilter::default()
        };
        assert_eq!(search.apply(customers)[0].id.as_i32(), 2);
    }

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(Some("  mug ")), Some("mug".to_string()));
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(None), None);
    }
}
