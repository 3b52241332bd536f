//! Pagination module
//!
//! Lazy, offset-cursor pagination over collection endpoints.
//!
//! # Overview
//!
//! A collection response carries one page of items and, in
//! `additional_data.pagination.next_start`, the offset of the next page.
//! [`PagedSequence`] exposes the fetched items as an immutable slice and
//! fetches the following page on demand through an injected [`PageFetcher`].
//!
//! ```rust,ignore
//! let mut page = PagedSequence::fetch_first("deals", PageOptions::default(), fetcher).await?;
//! loop {
//!     for deal in &page {
//!         println!("{deal:?}");
//!     }
//!     match page.next_page().await? {
//!         Some(next) => page = next,
//!         None => break,
//!     }
//! }
//! ```

mod fetcher;
mod sequence;
mod types;

pub use fetcher::{FnFetcher, PageFetcher};
pub use sequence::{PagedSequence, PagedSequenceBuilder};
pub use types::{
    next_page_target, AdditionalData, PageOptions, PaginationInfo, ResponseEnvelope,
    DEFAULT_PAGE_SIZE,
};
