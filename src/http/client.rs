//! HTTP client with retry and rate limiting
//!
//! The transport side of pagination:
//! - Resolves relative page targets against the API base URL
//! - Appends default query parameters (the API token)
//! - Retries 429s, retryable 5xx, timeouts and connection errors with backoff
//! - Decodes collection envelopes, acting as a [`PageFetcher`]

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::pagination::{PageFetcher, ResponseEnvelope};
use crate::types::{BackoffType, StringMap};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL relative targets are resolved against
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// Query parameters appended to every request
    pub default_query: Vec<(String, String)>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: StringMap::new(),
            default_query: Vec::new(),
            user_agent: format!("pipedrive-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter sent with every request
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_query.push((key.into(), value.into()));
        self
    }

    /// Authenticate with an API token passed as the `api_token` query parameter
    pub fn api_token(self, token: impl Into<String>) -> Self {
        self.query("api_token", token)
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Make a GET request
    pub async fn get(&self, target: &str) -> Result<Response> {
        self.request(Method::GET, target).await
    }

    /// Make a request, retrying transient failures
    pub async fn request(&self, method: Method, target: &str) -> Result<Response> {
        let url = self.build_url(target)?;
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            // Wait for rate limiter
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            // Build request
            let mut req = self.client.request(method.clone(), url.clone());

            // Add default headers
            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            // Send request
            let error = match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    // Check for rate limiting
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        Error::RateLimited {
                            retry_after_seconds: extract_retry_after(&response),
                        }
                    } else if status.is_client_error() || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        Error::http_status(status.as_u16(), body)
                    } else {
                        debug!("Request succeeded: {} {}", method, redact(&url));
                        return Ok(response);
                    }
                }
                Err(e) if e.is_timeout() => Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                },
                // The URL carries the API token
                Err(e) => Error::Http(e.without_url()),
            };

            // Give up on permanent errors or exhausted retries
            if attempt >= max_retries || !error.is_retryable() {
                return Err(error);
            }

            // Honor Retry-After, otherwise back off
            let delay = match &error {
                Error::RateLimited {
                    retry_after_seconds,
                } => Duration::from_secs(*retry_after_seconds),
                _ => self.calculate_backoff(attempt),
            };
            warn!(
                "{}, attempt {}/{}, retrying in {:?}",
                error,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Resolve a target into the URL actually requested
    ///
    /// Absolute targets are used as-is, relative ones are appended to the
    /// base URL. The target's own query string is kept and the default query
    /// parameters follow it.
    pub fn build_url(&self, target: &str) -> Result<Url> {
        let mut url = match Url::parse(target) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .config
                    .base_url
                    .as_deref()
                    .ok_or_else(|| Error::missing_field("base_url"))?;
                let base = base.trim_end_matches('/');
                let target = target.trim_start_matches('/');
                Url::parse(&format!("{base}/{target}"))?
            }
            Err(e) => return Err(e.into()),
        };

        if !self.config.default_query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.config.default_query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpClient
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, target: &str) -> Result<Option<ResponseEnvelope<T>>> {
        let response = self.get(target).await?;
        if response.status() == StatusCode::NO_CONTENT {
            debug!(%target, "No content, nothing to page");
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(|e| e.without_url())?;
        let envelope: ResponseEnvelope<T> = serde_json::from_slice(&bytes)?;
        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(Error::api_failure(message));
        }

        Ok(Some(envelope))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("max_retries", &self.config.max_retries)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}

/// URL without its query string, so the API token never reaches the logs
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
