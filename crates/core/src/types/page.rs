//! Offset pagination for catalog listings.

use serde::{Deserialize, Serialize};

/// A request for one page of results.
///
/// Page numbers are 0-based; the storefront converts from the 1-based
/// numbers shown to shoppers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Create a page request. A size of zero is bumped to one.
    #[must_use]
    pub const fn new(number: u32, size: u32) -> Self {
        Self {
            number,
            size: if size == 0 { 1 } else { size },
        }
    }

    /// 0-based page number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of items to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.number as u64 * self.size as u64
    }
}

/// One page of results plus enough context to render pagination links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Create a page.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            request,
            total_items,
        }
    }

    /// Total number of pages. An empty result still has one (empty) page.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(u64::from(self.request.size())).max(1)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.request.number()) + 1 < self.total_pages()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.request.number() > 0
    }

    /// Map the items while keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(0, 12).offset(), 0);
        assert_eq!(PageRequest::new(3, 12).offset(), 36);
    }

    #[test]
    fn test_zero_size_is_bumped() {
        assert_eq!(PageRequest::new(0, 0).size(), 1);
    }

    #[test]
    fn test_total_pages() {
        let page = Page::new(vec![1, 2], PageRequest::new(0, 2), 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let empty: Page<u8> = Page::new(Vec::new(), PageRequest::new(0, 10), 0);
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = Page::new(vec![5], PageRequest::new(2, 2), 5);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::new(1, 2), 4).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_items, 4);
        assert_eq!(page.request.number(), 1);
    }
}
