//! Pagination utilities for board listings

/// Page size constant for all board pagination
pub const PAGE_SIZE: usize = 25;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first item on the page
    pub offset: usize,
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use hrp_common::pagination::calculate_pagination;
///
/// // 60 total results = 3 pages (25 + 25 + 10)
/// let p = calculate_pagination(60, 2);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 25);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(60, 99);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 50);
/// ```
pub fn calculate_pagination(total_results: usize, requested_page: usize) -> Pagination {
    let total_pages = total_results.div_ceil(PAGE_SIZE);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

impl Pagination {
    /// Slice bounds of this page within `total_results` items
    pub fn range(&self, total_results: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(total_results);
        let end = (self.offset + PAGE_SIZE).min(total_results);
        start..end
    }
}
