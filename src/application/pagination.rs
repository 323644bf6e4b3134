//! Offset pagination shared by every public list endpoint.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized page/limit pair. `page` starts at 1; `limit` is clamped to
/// `1..=MAX_PAGE_SIZE`. Normalizing here keeps cache keys canonical: two
/// requests that mean the same page always derive the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

/// Public list response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paged<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page(),
            limit: request.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let page = PageRequest::new(None, None);
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PageRequest::new(None, Some(500)).limit(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(None, Some(0)).limit(), 1);
    }

    #[test]
    fn zero_page_normalizes_to_first() {
        let page = PageRequest::new(Some(0), Some(10));
        assert_eq!(page.page(), 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn offset_advances_by_limit() {
        let page = PageRequest::new(Some(3), Some(25));
        assert_eq!(page.offset(), 50);
    }
}
