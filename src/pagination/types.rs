//! Pagination types
//!
//! The response envelope returned by collection endpoints, the page options
//! a caller configures, and the query string used to request the next page.

use serde::{Deserialize, Serialize};

/// Page size used when the caller leaves `page_size` unset
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ============================================================================
// Response Envelope
// ============================================================================

/// Parsed body of a collection response
///
/// ```json
/// {
///   "success": true,
///   "data": [ ... ],
///   "additional_data": {
///     "pagination": {
///       "start": 0,
///       "limit": 100,
///       "more_items_in_collection": true,
///       "next_start": 100
///     }
///   }
/// }
/// ```
///
/// Every level is optional on the wire. A missing or `null` `data` means no
/// items, a missing `next_start` means no further pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    /// Whether the API considered the request successful
    #[serde(default = "default_success")]
    pub success: bool,

    /// Items of this page
    pub data: Option<Vec<T>>,

    /// Metadata carried next to the items
    #[serde(default)]
    pub additional_data: Option<AdditionalData>,

    /// Error message reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> Default for ResponseEnvelope<T> {
    fn default() -> Self {
        Self {
            success: true,
            data: None,
            additional_data: None,
            error: None,
        }
    }
}

impl<T> ResponseEnvelope<T> {
    /// Create an envelope holding the given items and no cursor
    pub fn new(items: Vec<T>) -> Self {
        Self {
            data: Some(items),
            ..Self::default()
        }
    }

    /// Set the `next_start` cursor
    #[must_use]
    pub fn with_next_start(mut self, next_start: u64) -> Self {
        let additional = self.additional_data.get_or_insert_with(AdditionalData::default);
        let pagination = additional
            .pagination
            .get_or_insert_with(PaginationInfo::default);
        pagination.next_start = Some(next_start);
        pagination.more_items_in_collection = Some(true);
        self
    }

    /// Cursor for the next page, if the envelope carries one
    pub fn next_start(&self) -> Option<u64> {
        self.additional_data
            .as_ref()
            .and_then(|additional| additional.pagination.as_ref())
            .and_then(|pagination| pagination.next_start)
    }

    /// Items of this page (empty when absent)
    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Take the items out of the envelope (empty when absent)
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// The `additional_data` block of a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalData {
    /// Pagination metadata
    #[serde(default)]
    pub pagination: Option<PaginationInfo>,
}

/// The `additional_data.pagination` block of a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Offset of the first item of this page
    #[serde(default)]
    pub start: Option<u64>,
    /// Limit the server applied to this page
    #[serde(default)]
    pub limit: Option<u32>,
    /// Whether the server holds more items past this page
    #[serde(default)]
    pub more_items_in_collection: Option<bool>,
    /// Offset to request next; absent on the last page
    #[serde(default)]
    pub next_start: Option<u64>,
}

// ============================================================================
// Page Options
// ============================================================================

/// Caller-side paging configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// Items requested per page (`DEFAULT_PAGE_SIZE` when unset)
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Offset of the first page (0 when unset)
    #[serde(default)]
    pub start_page: Option<u64>,
    /// Maximum number of pages a full traversal fetches (unbounded when unset)
    #[serde(default)]
    pub page_count: Option<u32>,
}

impl PageOptions {
    /// Create options with a page size
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Set the first page offset
    #[must_use]
    pub fn start_page(mut self, start: u64) -> Self {
        self.start_page = Some(start);
        self
    }

    /// Set the maximum number of pages
    #[must_use]
    pub fn page_count(mut self, count: u32) -> Self {
        self.page_count = Some(count);
        self
    }

    /// Page size sent as `limit`
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

// ============================================================================
// Request Target
// ============================================================================

/// Build the request target for the page starting at `start`
///
/// Produces `origin?start=<start>&limit=<limit>`. Both values are numeric so
/// no percent-encoding is applied.
pub fn next_page_target(origin: &str, start: u64, limit: u32) -> String {
    let query = [("start", start.to_string()), ("limit", limit.to_string())]
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{origin}?{query}")
}
