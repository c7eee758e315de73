//! Page-number pagination arithmetic for product listings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Offset window handed to the store for a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u32,
}

impl PageWindow {
    /// `page` and `limit` are expected to be at least 1; zero is treated as 1.
    pub fn new(page: u32, limit: u32) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        Self {
            skip: u64::from(page - 1) * u64::from(limit),
            limit,
        }
    }
}

/// Catalog-wide counters reported next to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogCounts {
    pub total: u64,
    pub enabled: u64,
    pub disabled: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_count: u64,
    pub total_enabled_count: u64,
    pub total_disabled_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub limit: u32,
}

impl Pagination {
    /// Out-of-range pages are reported as requested, never clamped. An empty
    /// catalog has no previous page, whatever page was asked for.
    pub fn compute(page: u32, limit: u32, counts: CatalogCounts) -> Self {
        let limit = limit.max(1);
        let total_pages = counts.total.div_ceil(u64::from(limit));

        Self {
            current_page: page,
            total_pages,
            total_count: counts.total,
            total_enabled_count: counts.enabled,
            total_disabled_count: counts.disabled,
            has_next: u64::from(page) < total_pages,
            has_prev: page > 1 && counts.total > 0,
            limit,
        }
    }
}
