//! Pagination request/response shapes.
//!
//! Pages are 1-based. Absent request values are left to the backend, which
//! falls back to [`DEFAULT_PAGE`] and [`DEFAULT_PAGE_SIZE`].

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

use serde::{Deserialize, Serialize};

use super::{Validate, null_as_default};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl PageParams {
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page: Some(page), page_size: Some(page_size) }
    }

    /// Query pairs for the values that are present.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_owned(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("page_size".to_owned(), page_size.to_string()));
        }
        query
    }
}

impl Validate for PageParams {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.page == Some(0) {
            errors.push("page must be at least 1".to_owned());
        }
        if self
            .page_size
            .is_some_and(|size| !(1..=MAX_PAGE_SIZE).contains(&size))
        {
            errors.push(format!("page_size must be between 1 and {MAX_PAGE_SIZE}"));
        }
        errors
    }
}

/// `ceil(total / page_size)`; zero when `page_size` is zero.
#[must_use]
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
