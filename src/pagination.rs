//! Numeric page/limit pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Clamped (page, limit, offset) triple ready for a SQL LIMIT/OFFSET.
    pub fn resolve(&self) -> (u32, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = (page as i64 - 1) * limit as i64;
        (page, limit as i64, offset)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: i64, total: i64) -> Self {
        let total_pages = (total + limit - 1) / limit;
        Self {
            current_page: page,
            total_pages,
            total_items: total,
            items_per_page: limit,
            has_next: (page as i64) < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: u32, limit: i64, total: i64) -> Self {
        Self { items, pagination: Pagination::new(page, limit, total) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults_and_clamps() {
        let q = PageQuery { page: None, limit: None };
        assert_eq!(q.resolve(), (1, 10, 0));
        let q = PageQuery { page: Some(3), limit: Some(500) };
        assert_eq!(q.resolve(), (3, 100, 200));
        let q = PageQuery { page: Some(0), limit: Some(0) };
        assert_eq!(q.resolve(), (1, 1, 0));
    }

    #[test]
    fn pagination_flags() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);
        let p = Pagination::new(3, 10, 25);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }
}
