//! Lenient page-number pagination.
//!
//! A page request never fails: a missing or non-numeric page resolves to the
//! first page, and anything past the end resolves to the last page.

use std::num::IntErrorKind;

use serde::Serialize;

/// Page size of search results.
pub const DEFAULT_SEARCH_PAGE_SIZE: u64 = 5;

/// Page size of the index listing.
pub const DEFAULT_INDEX_PAGE_SIZE: u64 = 6;

/// Parse a raw `page` parameter, defaulting to 1.
///
/// An integer too large for `i64` saturates, so it still lands on the last
/// page.
pub fn parse_page(input: Option<&str>) -> i64 {
    let Some(raw) = input else {
        return 1;
    };
    match raw.trim().parse::<i64>() {
        Ok(page) => page,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 1,
        },
    }
}

/// Clamp a requested page into `1..=total_pages`.
pub fn clamp_page(requested: i64, total_pages: u64) -> u64 {
    let last = total_pages.max(1);
    if requested < 1 {
        1
    } else {
        (requested as u64).min(last)
    }
}

/// Splits a result set of known size into fixed-size pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: u64,
}

impl Paginator {
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of pages for `count` items. An empty result still has one page.
    pub fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.page_size).max(1)
    }

    /// Resolve a raw page parameter against a result set of `count` items.
    pub fn resolve(&self, page_param: Option<&str>, count: u64) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = clamp_page(parse_page(page_param), num_pages);
        PageWindow {
            number,
            num_pages,
            count,
            page_size: self.page_size,
        }
    }
}

/// The slice of a result set a page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// 1-based page number.
    pub number: u64,
    pub num_pages: u64,
    /// Total items across all pages.
    pub count: u64,
    pub page_size: u64,
}

impl PageWindow {
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based index of the first item on the page, 0 when empty.
    pub fn start_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based index of the last item on the page.
    pub fn end_index(&self) -> u64 {
        (self.offset() + self.page_size).min(self.count)
    }
}

/// One page of items plus its position in the full result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    /// A single empty page.
    pub fn empty(page_size: u64) -> Self {
        Self {
            items: Vec::new(),
            window: Paginator::new(page_size).resolve(None, 0),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 1)]
    #[case(Some("2"), 2)]
    #[case(Some(" 3 "), 3)]
    #[case(Some("abc"), 1)]
    #[case(Some("2.5"), 1)]
    #[case(Some(""), 1)]
    #[case(Some("0"), 1)]
    #[case(Some("-4"), 1)]
    #[case(Some("4"), 4)]
    #[case(Some("5"), 4)]
    #[case(Some("99999999999999999999"), 4)]
    #[case(Some("+99999999999999999999"), 4)]
    #[case(Some("-99999999999999999999"), 1)]
    #[case(Some("1000"), 4)]
    fn test_resolve_is_permissive(#[case] page: Option<&str>, #[case] expected: u64) {
        // 20 items, 6 per page -> 4 pages
        let window = Paginator::new(6).resolve(page, 20);
        assert_eq!(window.num_pages, 4);
        assert_eq!(window.number, expected);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let window = Paginator::new(5).resolve(Some("7"), 0);
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.start_index(), 0);
        assert_eq!(window.end_index(), 0);
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_last_page_window() {
        let window = Paginator::new(5).resolve(Some("3"), 12);
        assert_eq!(window.offset(), 10);
        assert_eq!(window.start_index(), 11);
        assert_eq!(window.end_index(), 12);
        assert_eq!(window.previous_page_number(), Some(2));
        assert_eq!(window.next_page_number(), None);
    }

    #[test]
    fn test_zero_page_size_is_coerced() {
        let paginator = Paginator::new(0);
        assert_eq!(paginator.page_size(), 1);
        assert_eq!(paginator.num_pages(3), 3);
    }
}
