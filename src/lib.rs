//! # pipedrive-pager
//!
//! Lazy, cursor-based pagination over collection endpoints that wrap their
//! items in a `{ data, additional_data.pagination.next_start }` envelope.
//!
//! ## Features
//!
//! - **Immutable Pages**: every fetched page is a fresh [`PagedSequence`] value
//! - **Injected Fetching**: the network round-trip lives behind [`PageFetcher`]
//! - **HTTP Transport**: retrying, rate-limited reqwest client out of the box
//! - **Streams**: walk a whole collection as a `Stream` of pages
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipedrive_pager::{ClientConfig, PageFetcher, PageOptions, PagedSequence, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = ClientConfig::new("https://company.pipedrive.com/api/v1");
//!     config.api_token = Some("...".into());
//!
//!     let fetcher: Arc<dyn PageFetcher<serde_json::Value>> = Arc::new(config.http_client()?);
//!     let options = PageOptions::with_page_size(50);
//!     let mut page = PagedSequence::fetch_first("deals", options, fetcher).await?;
//!
//!     loop {
//!         for deal in &page {
//!             println!("{deal}");
//!         }
//!         match page.next_page().await? {
//!             Some(next) => page = next,
//!             None => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       PagedSequence<T>                       │
//! │  items (immutable)   origin   page options   continuation    │
//! │  next_page() → Option<PagedSequence<T>>   pages() → Stream   │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ origin?start=N&limit=M
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │                     PageFetcher<T> (trait)                   │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │  HttpClient                  │  FnFetcher (closures, stubs)  │
//! │  base URL, api_token, retry, │                               │
//! │  backoff, rate limit         │                               │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Paged sequences, envelopes and the fetcher capability
pub mod pagination;

/// HTTP client with retry and rate limiting
pub mod http;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{load_config, ClientConfig};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpClientConfig};
pub use pagination::{
    FnFetcher, PageFetcher, PageOptions, PagedSequence, ResponseEnvelope, DEFAULT_PAGE_SIZE,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
