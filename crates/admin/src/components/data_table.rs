//! Data table controls shared by the admin list pages.
//!
//! Every list page has a search box, one select filter (status or role)
//! and numbered pages; the query string carries all three so links are
//! shareable and survive a reload.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shopfront_core::Page;
use shopfront_core::listing::normalize_search;

/// List page query parameters.
///
/// Kept as strings so blank or stale values are ignored instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    #[must_use]
    pub fn search(&self) -> Option<String> {
        normalize_search(self.q.as_deref())
    }

    /// The `status` filter, if it names a valid value.
    #[must_use]
    pub fn status<T: FromStr>(&self) -> Option<T> {
        parse_choice(self.status.as_deref())
    }

    /// The `role` filter, if it names a valid value.
    #[must_use]
    pub fn role<T: FromStr>(&self) -> Option<T> {
        parse_choice(self.role.as_deref())
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }

    /// Link to `page` of the same list with the same filters.
    fn page_href(&self, base_path: &str, page: usize) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(q) = self.search() {
            query.append_pair("q", &q);
        }
        for (key, value) in [("status", &self.status), ("role", &self.role)] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                query.append_pair(key, value);
            }
        }
        query.append_pair("page", &page.to_string());
        format!("{base_path}?{}", query.finish())
    }
}

fn parse_choice<T: FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Option for a select filter.
#[derive(Debug, Clone)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
    pub selected: bool,
}

impl FilterOption {
    /// Options for every choice, marking the active one.
    pub fn list<T>(choices: &[T], active: Option<T>, label: impl Fn(&T) -> &'static str) -> Vec<Self>
    where
        T: Copy + PartialEq + std::fmt::Display,
    {
        choices
            .iter()
            .map(|choice| Self {
                value: choice.to_string(),
                label: label(choice).to_string(),
                selected: active == Some(*choice),
            })
            .collect()
    }
}

/// Pager state for a list page.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub first_item: usize,
    pub last_item: usize,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    #[must_use]
    pub fn new<T>(page: &Page<T>, base_path: &str, query: &ListQuery) -> Self {
        Self {
            current_page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            first_item: page.first_item_number(),
            last_item: page.last_item_number(),
            prev_url: page
                .has_previous()
                .then(|| query.page_href(base_path, page.previous_page())),
            next_url: page
                .has_next()
                .then(|| query.page_href(base_path, page.next_page())),
        }
    }
}

/// Short date for table cells, or a dash when unknown.
#[must_use]
pub fn format_date(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |dt| dt.format("%b %-d, %Y").to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::{OrderStatus, UserRole};

    fn query(q: &str, status: &str, page: &str) -> ListQuery {
        ListQuery {
            q: Some(q.to_string()),
            status: Some(status.to_string()),
            role: None,
            page: Some(page.to_string()),
        }
    }

    #[test]
    fn test_blank_and_unknown_values_are_ignored() {
        let query = query("  ", "lost", "x");
        assert_eq!(query.search(), None);
        assert_eq!(query.status::<OrderStatus>(), None);
        assert_eq!(query.page(), 1);
        assert_eq!(ListQuery::default().role::<UserRole>(), None);
    }

    #[test]
    fn test_pagination_links_keep_filters() {
        let query = query("ada lovelace", "shipped", "2");
        let page = Page::paginate((1..=45).collect::<Vec<_>>(), query.page(), 20);
        let pager = Pagination::new(&page, "/orders", &query);

        assert_eq!(pager.first_item, 21);
        assert_eq!(pager.last_item, 40);
        assert_eq!(
            pager.prev_url.as_deref(),
            Some("/orders?q=ada+lovelace&status=shipped&page=1")
        );
        assert_eq!(
            pager.next_url.as_deref(),
            Some("/orders?q=ada+lovelace&status=shipped&page=3")
        );
    }

    #[test]
    fn test_filter_options_mark_selection() {
        let options = FilterOption::list(
            &OrderStatus::FILTERABLE,
            Some(OrderStatus::Shipped),
            OrderStatus::label,
        );
        assert_eq!(options.len(), 5);
        assert!(options.iter().any(|o| o.selected && o.value == "shipped"));
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn test_format_date() {
        let dt = DateTime::parse_from_rfc3339("2026-03-09T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_date(Some(&dt)), "Mar 9, 2026");
        assert_eq!(format_date(None), "-");
    }
}
