//! Paginated listing results.

use serde::{Deserialize, Serialize};

/// One page of a filtered listing.
///
/// # Examples
///
/// ```
/// use rbac_core::Page;
///
/// let page: Page<u32> = Page {
///     items: vec![1, 2],
///     total_count: 45,
///     page: 1,
///     limit: 20,
/// };
/// assert_eq!(page.page_count(), 3);
/// assert!(page.has_next());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows of this page
    pub items: Vec<T>,

    /// Rows matching the filter across all pages
    pub total_count: u64,

    /// 1-indexed page number
    pub page: u64,

    /// Page size that was applied
    pub limit: u64,
}

impl<T> Page<T> {
    /// Number of pages needed for `total_count` rows. Zero when `limit` is zero.
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.limit)
    }

    /// Whether a page follows this one.
    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}
