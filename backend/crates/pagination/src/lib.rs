//! Offset pagination primitives shared by the yamda list endpoints.
//!
//! The crate stays transport-agnostic: it knows nothing about HTTP query
//! strings or SQL. Callers validate raw input first, then build a
//! [`PageRequest`] and translate it into `LIMIT`/`OFFSET` clauses. Responses
//! describe the page they returned with [`PageMetadata`].

use serde::Serialize;
use thiserror::Error;

/// Errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be greater than zero")]
    ZeroPage,
    /// A page must hold at least one record.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// A one-based page window over an ordered result set.
///
/// # Examples
///
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 20).expect("valid page request");
/// assert_eq!(request.limit(), 20);
/// assert_eq!(request.offset(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a page request, rejecting zero values.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is zero.
    pub const fn new(page: u32, page_size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }
        Ok(Self { page, page_size })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of records per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Value for a SQL `LIMIT` clause.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Value for a SQL `OFFSET` clause: `(page - 1) * page_size`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

/// Describes the page returned by a list endpoint.
///
/// An empty result set yields a metadata object with every field omitted,
/// which serialises as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    /// Page that was returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    /// Records per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Always `1` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_page: Option<u64>,
    /// Last page holding at least one record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u64>,
    /// Total number of records matching the filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
}

impl PageMetadata {
    /// Compute metadata for `request` given the total number of matches.
    #[must_use]
    pub fn calculate(total_records: u64, request: PageRequest) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        Self {
            current_page: Some(request.page()),
            page_size: Some(request.page_size()),
            first_page: Some(1),
            last_page: Some(total_records.div_ceil(u64::from(request.page_size()))),
            total_records: Some(total_records),
        }
    }
}

/// Direction applied to a sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first; written with a leading `-` on the wire.
    Descending,
}

/// A sort key drawn from an allow-list, such as `title` or `-year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<'a> {
    /// Column name with any `-` prefix removed.
    pub column: &'a str,
    /// Requested direction.
    pub direction: SortDirection,
}

impl<'a> SortKey<'a> {
    /// Resolve `raw` against `allowed`, returning `None` when it is not listed.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::{SortDirection, SortKey};
    ///
    /// let key = SortKey::parse("-year", &["year", "-year"]).expect("allowed");
    /// assert_eq!(key.column, "year");
    /// assert_eq!(key.direction, SortDirection::Descending);
    /// assert!(SortKey::parse("rating", &["year"]).is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &'a str, allowed: &[&str]) -> Option<Self> {
        if !allowed.contains(&raw) {
            return None;
        }
        Some(raw.strip_prefix('-').map_or(
            Self {
                column: raw,
                direction: SortDirection::Ascending,
            },
            |column| Self {
                column,
                direction: SortDirection::Descending,
            },
        ))
    }
}
