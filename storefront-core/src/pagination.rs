use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// A clamped page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.clamp(1, u32::MAX as i64) as u32,
            per_page: per_page.clamp(1, MAX_PER_PAGE as i64) as u32,
        }
    }

    /// Builds a request from raw query-string values. If either value is not
    /// an integer both fall back to their defaults.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Self {
        let parse = |raw: Option<&str>, default: u32| match raw {
            Some(raw) => raw.trim().parse::<i64>().ok(),
            None => Some(default as i64),
        };

        match (parse(page, DEFAULT_PAGE), parse(per_page, DEFAULT_PER_PAGE)) {
            (Some(page), Some(per_page)) => Self::new(page, per_page),
            _ => Self::default(),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.per_page as u64);
        Self {
            items,
            meta: PageMeta {
                page: request.page,
                per_page: request.per_page,
                total_items,
                total_pages,
                has_next: (request.page as u64) < total_pages,
                has_prev: request.page > 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_defaults_and_clamping() {
        assert_eq!(PageRequest::from_query(None, None), PageRequest { page: 1, per_page: 20 });
        assert_eq!(PageRequest::from_query(Some("3"), Some("500")), PageRequest { page: 3, per_page: 100 });
        assert_eq!(PageRequest::from_query(Some("-2"), Some("0")), PageRequest { page: 1, per_page: 1 });
        // one bad value resets both
        assert_eq!(PageRequest::from_query(Some("4"), Some("lots")), PageRequest::default());
    }

    #[test]
    fn test_offset() {
        let request = PageRequest::new(3, 10);
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn test_page_meta() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 5);
        assert_eq!(page.meta.total_pages, 3);
        assert!(page.meta.has_next);
        assert!(page.meta.has_prev);

        let empty: Page<u8> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.meta.total_pages, 0);
        assert!(!empty.meta.has_next);
        assert!(!empty.meta.has_prev);
    }
}
