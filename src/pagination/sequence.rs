//! Immutable paged sequence
//!
//! A [`PagedSequence`] holds one fetched page and the state needed to ask for
//! the next one. Fetching a page never touches the current value; it returns
//! a brand-new sequence sharing the same origin, options and fetcher.

use super::fetcher::PageFetcher;
use super::types::{next_page_target, PageOptions, ResponseEnvelope};
use crate::error::{Error, Result};
use futures::stream::{self, Stream, TryStreamExt};
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// One page of a remote collection plus its continuation
pub struct PagedSequence<T> {
    items: Arc<[T]>,
    origin: String,
    options: PageOptions,
    continuation: Option<u64>,
    fetcher: Arc<dyn PageFetcher<T>>,
}

impl<T> PagedSequence<T> {
    /// Wrap an already fetched envelope
    pub fn new(
        origin: impl Into<String>,
        options: PageOptions,
        envelope: ResponseEnvelope<T>,
        fetcher: Arc<dyn PageFetcher<T>>,
    ) -> Self {
        let continuation = envelope.next_start();
        Self {
            items: envelope.into_items().into(),
            origin: origin.into(),
            options,
            continuation,
            fetcher,
        }
    }

    /// Start building a sequence for `origin`
    pub fn builder(origin: impl Into<String>) -> PagedSequenceBuilder<T> {
        PagedSequenceBuilder {
            origin: origin.into(),
            options: PageOptions::default(),
            envelope: None,
            fetcher: None,
        }
    }

    /// Items of this page in server order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Resource target later pages are derived from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Paging options shared by the whole chain
    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    /// Offset of the next page, `None` on the last page
    pub fn continuation(&self) -> Option<u64> {
        self.continuation
    }

    /// Whether `next_page` would issue a request
    pub fn has_next_page(&self) -> bool {
        self.continuation.is_some()
    }

    /// Request target for the next page, `None` on the last page
    pub fn next_page_target(&self) -> Option<String> {
        self.continuation
            .map(|start| next_page_target(&self.origin, start, self.options.effective_page_size()))
    }

    /// Fetch the page after this one
    ///
    /// Returns `Ok(None)` without calling the fetcher when there is no
    /// continuation, or when the fetcher has nothing to fetch. Fetcher errors
    /// are returned as-is.
    pub async fn next_page(&self) -> Result<Option<Self>> {
        let Some(target) = self.next_page_target() else {
            debug!(origin = %self.origin, "No continuation, page chain exhausted");
            return Ok(None);
        };

        debug!(%target, "Fetching next page");
        let Some(envelope) = self.fetcher.fetch_page(&target).await? else {
            debug!(%target, "Fetcher returned nothing, stopping");
            return Ok(None);
        };

        let next = Self::new(
            self.origin.clone(),
            self.options,
            envelope,
            Arc::clone(&self.fetcher),
        );
        debug!(
            %target,
            items = next.len(),
            next_start = ?next.continuation,
            "Fetched page"
        );
        Ok(Some(next))
    }

    /// Fetch the first page of `origin`
    ///
    /// The first request starts at `options.start_page` (0 when unset). A
    /// fetcher answering `Ok(None)` yields an empty, exhausted sequence.
    pub async fn fetch_first(
        origin: impl Into<String>,
        options: PageOptions,
        fetcher: Arc<dyn PageFetcher<T>>,
    ) -> Result<Self> {
        let origin = origin.into();
        let target = next_page_target(
            &origin,
            options.start_page.unwrap_or(0),
            options.effective_page_size(),
        );

        debug!(%target, "Fetching first page");
        let envelope = fetcher.fetch_page(&target).await?.unwrap_or_default();
        Ok(Self::new(origin, options, envelope, fetcher))
    }
}

impl<T: Send + Sync + 'static> PagedSequence<T> {
    /// Stream this page followed by every later page
    ///
    /// Each page is requested only when the stream is polled past the
    /// previous one. Ends after the last page, after `options.page_count`
    /// pages, or right after yielding the first error.
    pub fn pages(self) -> impl Stream<Item = Result<Self>> + Send {
        let limit = self.options.page_count;
        stream::try_unfold(
            (Some(self), true, 0u32),
            move |(previous, first, yielded)| async move {
                if limit.is_some_and(|limit| yielded >= limit) {
                    debug!(pages = yielded, "Page count reached");
                    return Ok(None);
                }
                let Some(previous) = previous else {
                    return Ok(None);
                };

                let page = if first {
                    Some(previous)
                } else {
                    previous.next_page().await?
                };

                Ok::<_, Error>(page.map(|page| (page.clone(), (Some(page), false, yielded + 1))))
            },
        )
    }

    /// Fetch every remaining page and concatenate the items in order
    pub async fn collect_all(self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        self.pages()
            .try_fold(Vec::new(), |mut items, page| async move {
                items.extend_from_slice(page.items());
                Ok(items)
            })
            .await
    }
}

impl<T> Clone for PagedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            origin: self.origin.clone(),
            options: self.options,
            continuation: self.continuation,
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<T> Deref for PagedSequence<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a PagedSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PagedSequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedSequence")
            .field("items", &self.items)
            .field("origin", &self.origin)
            .field("options", &self.options)
            .field("continuation", &self.continuation)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`PagedSequence`] that checks its collaborators are present
pub struct PagedSequenceBuilder<T> {
    origin: String,
    options: PageOptions,
    envelope: Option<ResponseEnvelope<T>>,
    fetcher: Option<Arc<dyn PageFetcher<T>>>,
}

impl<T> PagedSequenceBuilder<T> {
    /// Set the paging options
    #[must_use]
    pub fn options(mut self, options: PageOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the fetched envelope
    #[must_use]
    pub fn envelope(mut self, envelope: ResponseEnvelope<T>) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Set the page fetcher
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the sequence
    ///
    /// Fails with [`Error::InvalidArgument`] when the envelope or the fetcher
    /// was never supplied.
    pub fn build(self) -> Result<PagedSequence<T>> {
        let envelope = self
            .envelope
            .ok_or_else(|| Error::invalid_argument("response"))?;
        let fetcher = self
            .fetcher
            .ok_or_else(|| Error::invalid_argument("next_page_fetcher"))?;
        Ok(PagedSequence::new(self.origin, self.options, envelope, fetcher))
    }
}
