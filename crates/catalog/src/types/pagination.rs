//! Pagination types for listing and search results.
//!
//! The public API pages with a 1-based page number and a per-page limit. Both
//! backends translate that into their own form (skip/limit for the document
//! store, page/per_page for the search index).

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Pagination configuration for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,

    /// Maximum number of results per page.
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 25 }
    }
}

impl Pagination {
    /// Creates pagination for the given page and limit.
    ///
    /// # Errors
    ///
    /// Page and limit must both be at least 1.
    pub fn new(page: u32, limit: u32) -> QueryResult<Self> {
        if page == 0 {
            return Err(QueryError::invalid("page", "page numbers start at 1"));
        }
        if limit == 0 {
            return Err(QueryError::invalid("limit", "limit must be positive"));
        }
        Ok(Self { page, limit })
    }

    /// First page with the given limit.
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    /// Caps the limit at `max`.
    pub fn clamped(mut self, max: u32) -> Self {
        self.limit = self.limit.min(max.max(1));
        self
    }

    /// Number of records to skip before this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items in this page.
    pub data: Vec<T>,

    /// Pagination information.
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    /// Creates a page from items and the total number of matches.
    pub fn new(data: Vec<T>, pagination: &Pagination, total: u64) -> Self {
        let info = PageInfo::new(pagination, data.len() as u32, total);
        Self {
            data,
            pagination: info,
        }
    }

    /// An empty page.
    pub fn empty(pagination: &Pagination) -> Self {
        Self::new(Vec::new(), pagination, 0)
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maps the items while keeping the pagination info.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Pagination block returned next to a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The page that was requested.
    pub current_page: u32,

    /// The last page that has results.
    pub last_visible_page: u32,

    /// Whether a following page exists.
    pub has_next_page: bool,

    /// Item counts.
    pub items: PageItems,
}

/// Item counts for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageItems {
    /// Items on this page.
    pub count: u32,

    /// Total matching items.
    pub total: u64,

    /// Requested page size.
    pub per_page: u32,
}

impl PageInfo {
    fn new(pagination: &Pagination, count: u32, total: u64) -> Self {
        let per_page = u64::from(pagination.limit.max(1));
        let last_visible_page = total.div_ceil(per_page).max(1);
        Self {
            current_page: pagination.page,
            last_visible_page: u32::try_from(last_visible_page).unwrap_or(u32::MAX),
            has_next_page: u64::from(pagination.page) < last_visible_page,
            items: PageItems {
                count,
                total,
                per_page: pagination.limit,
            },
        }
    }
}
