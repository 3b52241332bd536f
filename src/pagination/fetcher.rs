//! Page fetcher capability
//!
//! The paged sequence never talks to the network itself. It hands a request
//! target to a [`PageFetcher`] and wraps whatever envelope comes back.

use super::types::ResponseEnvelope;
use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Fetches one page of a collection for a request target
///
/// The target is relative (`origin?start=N&limit=M`); resolving it against a
/// base URL is the implementor's job. Returning `Ok(None)` means there is
/// nothing to fetch and ends the page chain without an error.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetch the envelope for `target`
    async fn fetch_page(&self, target: &str) -> Result<Option<ResponseEnvelope<T>>>;
}

/// Adapts an async closure into a [`PageFetcher`]
///
/// ```rust,ignore
/// let fetcher = FnFetcher::new(|target: String| async move {
///     let body = reqwest::get(format!("{BASE}/{target}")).await?.bytes().await?;
///     Ok(Some(serde_json::from_slice(&body)?))
/// });
/// ```
pub struct FnFetcher<T, F> {
    func: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FnFetcher<T, F> {
    /// Wrap a closure
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnFetcher<T, F>
where
    T: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<ResponseEnvelope<T>>>> + Send,
{
    async fn fetch_page(&self, target: &str) -> Result<Option<ResponseEnvelope<T>>> {
        (self.func)(target.to_string()).await
    }
}

impl<T, F> std::fmt::Debug for FnFetcher<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}
