//! Pagination Controller
//!
//! Page arithmetic over the remote total count. Pages are 1-based and there
//! is always at least one page, even for zero results.

use serde::{Deserialize, Serialize};

/// Page bounds derived from the latest total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_count: u64,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(total_count: u64, page_size: u32) -> Self {
        Self {
            total_count,
            page_size: page_size.max(1),
        }
    }

    /// `ceil(total_count / page_size)`, with zero results shown as one empty page.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_count.div_ceil(self.page_size as u64);
        pages.clamp(1, u32::MAX as u64) as u32
    }

    /// Whether `page` is a valid page to request.
    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages()
    }

    /// Nearest valid page.
    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages())
    }

    /// The page after `page`, or `None` on the last page.
    pub fn next_of(&self, page: u32) -> Option<u32> {
        if page < self.total_pages() {
            Some(page + 1)
        } else {
            None
        }
    }

    /// The page before `page`, or `None` on the first page.
    pub fn previous_of(&self, page: u32) -> Option<u32> {
        if page > 1 {
            Some(page - 1)
        } else {
            None
        }
    }

    /// 1-based positions of the first and last result on `page`, if any.
    pub fn item_range(&self, page: u32) -> Option<(u64, u64)> {
        if !self.contains(page) || self.total_count == 0 {
            return None;
        }
        let first = (page as u64 - 1) * self.page_size as u64 + 1;
        let last = (first + self.page_size as u64 - 1).min(self.total_count);
        Some((first, last))
    }
}
