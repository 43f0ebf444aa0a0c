//! Offset pagination (skip/take) for queries and filtered includes.
//!
//! ```rust
//! use navtree_query::Pagination;
//!
//! let pagination = Pagination::new().skip(10).take(20);
//! assert_eq!(pagination.skip, Some(10));
//! assert_eq!(pagination.take, Some(20));
//!
//! let page_3 = Pagination::page(3, 25);
//! assert_eq!(page_3.skip, Some(50));
//! assert!(Pagination::new().is_empty());
//! ```

use std::fmt;

/// Pagination configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of records to skip.
    pub skip: Option<u64>,
    /// Maximum number of records to take.
    pub take: Option<u64>,
}

impl Pagination {
    /// Create a new pagination with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of records to skip.
    ///
    /// Repeated skips accumulate, and skipping after a take shrinks the
    /// remaining window, matching how chained `Skip` calls compose.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(self.skip.unwrap_or(0).saturating_add(skip));
        self.take = self.take.map(|t| t.saturating_sub(skip));
        self
    }

    /// Set the maximum number of records to take.
    ///
    /// Repeated takes keep the smallest limit.
    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(self.take.map_or(take, |t| t.min(take)));
        self
    }

    /// Check if pagination is specified.
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }

    /// Get pagination for the first N records.
    pub fn first(n: u64) -> Self {
        Self::new().take(n)
    }

    /// Get pagination for a page (1-indexed).
    pub fn page(page: u64, page_size: u64) -> Self {
        let skip = page.saturating_sub(1) * page_size;
        Self::new().skip(skip).take(page_size)
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.skip, self.take) {
            (Some(skip), Some(take)) => write!(f, "SKIP {} TAKE {}", skip, take),
            (Some(skip), None) => write!(f, "SKIP {}", skip),
            (None, Some(take)) => write!(f, "TAKE {}", take),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_skip_accumulates() {
        let pagination = Pagination::new().skip(1).skip(2);
        assert_eq!(pagination.skip, Some(3));
    }

    #[test]
    fn test_skip_after_take_shrinks_window() {
        let pagination = Pagination::new().take(10).skip(3);
        assert_eq!(pagination, Pagination { skip: Some(3), take: Some(7) });
    }

    #[test]
    fn test_chained_take_keeps_minimum() {
        let pagination = Pagination::new().take(10).take(2).take(5);
        assert_eq!(pagination.take, Some(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pagination::page(2, 10).to_string(), "SKIP 10 TAKE 10");
        assert_eq!(Pagination::first(3).to_string(), "TAKE 3");
        assert_eq!(Pagination::new().to_string(), "");
    }
}
