//! Page-based pagination.
//!
//! List endpoints take a 1-based page number from the path and a page size
//! from configuration. Page `0` is reserved by a few endpoints to mean
//! "everything"; see [`PageRequest::all`].
//!
//! # Example JSON Response
//!
//! ```json
//! {
//!   "data": [...],
//!   "meta": {
//!     "total": 45,
//!     "limit": 20,
//!     "offset": 20,
//!     "page": 2,
//!     "has_more": true
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Maximum items per page (the limit that was applied)
    pub limit: i64,
    /// Number of items skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Current page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether there are more items after this page
    pub has_more: bool,
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    per_page: i64,
    unbounded: bool,
}

impl PageRequest {
    /// Page numbers below 1 are treated as page 1; the page size is clamped to [1, 100].
    #[must_use]
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
            unbounded: false,
        }
    }

    /// A request for every row, used when a caller asks for page 0.
    #[must_use]
    pub fn all() -> Self {
        Self {
            page: 1,
            per_page: i64::MAX,
            unbounded: true,
        }
    }

    /// `page == 0` means "all rows" for endpoints that support it.
    #[must_use]
    pub fn from_page_or_all(page: i64, per_page: i64) -> Self {
        if page == 0 {
            Self::all()
        } else {
            Self::new(page, per_page)
        }
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        if self.unbounded {
            0
        } else {
            (self.page - 1) * self.per_page
        }
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    /// SQL tail for this window (`LIMIT .. OFFSET ..`), empty when unbounded.
    #[must_use]
    pub fn sql_suffix(&self) -> String {
        if self.unbounded {
            String::new()
        } else {
            format!(" LIMIT {} OFFSET {}", self.limit(), self.offset())
        }
    }

    /// Builds the response metadata for a query that matched `total` rows.
    #[must_use]
    pub fn meta(&self, total: i64) -> PaginationMeta {
        if self.unbounded {
            return PaginationMeta {
                total,
                limit: total,
                offset: Some(0),
                page: None,
                has_more: false,
            };
        }

        PaginationMeta {
            total,
            limit: self.limit(),
            offset: Some(self.offset()),
            page: Some(self.page),
            has_more: self.offset() + self.limit() < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_zero_offset() {
        let page = PageRequest::new(1, 20);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn test_offset_is_one_based() {
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_page_below_one_is_clamped() {
        assert_eq!(PageRequest::new(-4, 20).page(), 1);
        assert_eq!(PageRequest::new(0, 20).offset(), 0);
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(PageRequest::new(1, 0).limit(), 1);
        assert_eq!(PageRequest::new(1, 500).limit(), 100);
    }

    #[test]
    fn test_zero_means_all_when_requested() {
        let page = PageRequest::from_page_or_all(0, 20);
        assert!(page.is_unbounded());
        assert_eq!(page.sql_suffix(), "");
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_sql_suffix() {
        assert_eq!(PageRequest::new(2, 5).sql_suffix(), " LIMIT 5 OFFSET 5");
    }

    #[test]
    fn test_meta_has_more() {
        let meta = PageRequest::new(1, 20).meta(45);
        assert!(meta.has_more);
        assert_eq!(meta.page, Some(1));

        let meta = PageRequest::new(3, 20).meta(45);
        assert!(!meta.has_more);
        assert_eq!(meta.offset, Some(40));
    }

    #[test]
    fn test_meta_for_unbounded() {
        let meta = PageRequest::all().meta(7);
        assert_eq!(meta.limit, 7);
        assert!(!meta.has_more);
        assert_eq!(meta.page, None);
    }

    #[test]
    fn test_meta_serialize() {
        let meta = PageRequest::new(2, 20).meta(100);
        let serialized = serde_json::to_string(&meta).unwrap();
        assert!(serialized.contains(r#""total":100"#));
        assert!(serialized.contains(r#""offset":20"#));
        assert!(serialized.contains(r#""has_more":true"#));
    }
}
