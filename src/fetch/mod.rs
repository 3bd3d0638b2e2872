//! Rate-limited fetching
//!
//! This module contains the HTTP fetch path shared by every extractor:
//! - Building an HTTP client with the configured identity header
//! - Session-scoped adaptive delay computation
//! - Retry with exponential backoff and throttle-status amplification

mod fetcher;
mod limiter;

pub use fetcher::{build_http_client, FetchedPage, Fetcher};
pub use limiter::{RateLimiter, RetryPolicy};
