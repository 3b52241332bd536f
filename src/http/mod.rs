//! HTTP transport
//!
//! The page fetcher used against a live API.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, retryable 5xx, timeouts and connect errors
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Token Auth**: `api_token` appended to every request

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
