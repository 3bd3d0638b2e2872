//! HTTP fetcher with rate limiting and retry
//!
//! Every request the extractors make goes through [`Fetcher::fetch`], which
//! sleeps the session-computed delay before each attempt, amplifies the delay
//! on throttling status codes, and retries transport timeouts with
//! exponential backoff.

use crate::config::Config;
use crate::fetch::{RateLimiter, RetryPolicy};
use crate::ExtractError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

/// Builds an HTTP client with the configured identity header and timeouts
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(&config.source.user_agent)
        .timeout(Duration::from_secs(config.fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited HTTP fetcher
///
/// Owns the HTTP client and the session-scoped [`RateLimiter`] exclusively
/// for one extraction run. Not meant to be shared across concurrent runs: the
/// request-count-based throttling is a run-scoped heuristic.
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(config: &Config, cancel: CancellationToken) -> crate::Result<Self> {
        let client = build_http_client(config)?;
        let limiter = RateLimiter::new(RetryPolicy::from_config(&config.fetch));
        Ok(Self {
            client,
            limiter,
            cancel,
        })
    }

    /// Number of requests this session has made so far
    pub fn request_count(&self) -> u64 {
        self.limiter.request_count()
    }

    /// Fetches a URL with the default delay multiplier.
    pub async fn fetch(&mut self, url: &str) -> crate::Result<FetchedPage> {
        self.fetch_with_multiplier(url, 1.0).await
    }

    /// Fetches a URL, scaling the pre-request delay by `delay_multiplier`.
    ///
    /// # Retry behavior
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429 | Delay ×3, retry |
    /// | HTTP 403/502/503 | Delay ×2, retry |
    /// | Timeout / connection error | Exponential backoff, retry |
    /// | Other non-success status | Immediate `HttpStatus` error |
    ///
    /// All retries are bounded by the policy's `retry_attempts`; the delay
    /// between consecutive attempts never decreases and never exceeds
    /// `max_delay`. Exhaustion surfaces as `ExhaustedRetries`, except when
    /// the final attempt itself timed out or failed in transport, which
    /// surfaces as `Timeout` or `Http`.
    pub async fn fetch_with_multiplier(
        &mut self,
        url: &str,
        delay_multiplier: f64,
    ) -> crate::Result<FetchedPage> {
        let attempts = self.limiter.policy().retry_attempts;
        let mut delay = self.limiter.initial_delay(delay_multiplier);

        for attempt in 0..attempts {
            if self.cancel.is_cancelled() {
                return Err(ExtractError::Cancelled);
            }

            if attempt > 0 {
                delay = self.limiter.backoff(delay);
                tracing::info!(
                    "Retry attempt {}/{} for {}, waiting {:.1}s",
                    attempt + 1,
                    attempts,
                    url,
                    delay.as_secs_f64()
                );
            }

            tokio::time::sleep(delay).await;

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    tracing::warn!("Request timeout on attempt {}/{} for {}", attempt + 1, attempts, url);
                    if attempt == attempts - 1 {
                        return Err(ExtractError::Timeout {
                            url: url.to_string(),
                        });
                    }
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        "Request failed on attempt {}/{} for {}: {}",
                        attempt + 1,
                        attempts,
                        url,
                        e
                    );
                    if attempt == attempts - 1 {
                        return Err(ExtractError::Http {
                            url: url.to_string(),
                            source: e,
                        });
                    }
                    continue;
                }
            };

            self.limiter.record_request();
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Rate limited on attempt {}, increasing delay", attempt + 1);
                delay = self.limiter.amplify(delay, 3.0);
                continue;
            }

            if matches!(status.as_u16(), 403 | 502 | 503) {
                tracing::warn!(
                    "Potential blocking detected (status {}), backing off",
                    status.as_u16()
                );
                delay = self.limiter.amplify(delay, 2.0);
                continue;
            }

            if !status.is_success() {
                return Err(ExtractError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let final_url = response.url().to_string();
            let body = response.text().await.map_err(|e| ExtractError::Http {
                url: url.to_string(),
                source: e,
            })?;

            return Ok(FetchedPage {
                final_url,
                status: status.as_u16(),
                body,
            });
        }

        Err(ExtractError::ExhaustedRetries {
            url: url.to_string(),
            attempts,
        })
    }

    /// Fetches a URL and parses the body as JSON.
    pub async fn fetch_json(
        &mut self,
        url: &str,
        delay_multiplier: f64,
    ) -> crate::Result<serde_json::Value> {
        let page = self.fetch_with_multiplier(url, delay_multiplier).await?;
        Ok(serde_json::from_str(&page.body)?)
    }
}
