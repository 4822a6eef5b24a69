//! Reusable building blocks for admin pages.

pub mod data_table;

pub use data_table::{FilterOption, ListQuery, Pagination, format_date};
