use crate::config::FetchConfig;
use std::time::{Duration, Instant};

/// Request count beyond which the adaptive per-request delay kicks in
const ADAPTIVE_REQUEST_THRESHOLD: u64 = 50;

/// Largest adaptive delay increment (seconds)
const ADAPTIVE_DELAY_CAP_SECS: f64 = 2.0;

/// Session age beyond which every delay is multiplied by the sustained factor
const SUSTAINED_SESSION_THRESHOLD: Duration = Duration::from_secs(300);

/// Multiplier applied once the session exceeds the sustained threshold
const SUSTAINED_SESSION_MULTIPLIER: f64 = 1.5;

/// Retry and backoff parameters. Immutable for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Base delay applied before every request
    pub base_delay: Duration,

    /// Upper bound on any backoff delay between attempts
    pub max_delay: Duration,

    /// Multiplier applied to the delay between retry attempts
    pub backoff_factor: f64,

    /// Maximum number of attempts per fetch call
    pub retry_attempts: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_factor: config.backoff_factor,
            retry_attempts: config.retry_attempts,
        }
    }
}

/// Session-scoped adaptive throttling state
///
/// Owned by exactly one [`Fetcher`](crate::fetch::Fetcher) for the duration
/// of a run and discarded afterwards. The request counter feeds back into the
/// delay computation: the more requests a session has made, the longer the
/// subsequent delays, to resemble a human browsing cadence.
#[derive(Debug)]
pub struct RateLimiter {
    policy: RetryPolicy,
    request_count: u64,
    session_start: Instant,
}

impl RateLimiter {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            request_count: 0,
            session_start: Instant::now(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Number of requests recorded in this session
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Computes the delay to sleep before the first attempt of a fetch call.
    ///
    /// Starts from `base_delay * multiplier`, adds an adaptive increment once
    /// the session has made more than 50 requests, and multiplies by 1.5 once
    /// the session is older than five minutes.
    pub fn initial_delay(&self, multiplier: f64) -> Duration {
        let mut delay = self.policy.base_delay.mul_f64(multiplier);

        if self.request_count > ADAPTIVE_REQUEST_THRESHOLD {
            let adaptive = (self.request_count as f64 / 100.0).min(ADAPTIVE_DELAY_CAP_SECS);
            delay += Duration::from_secs_f64(adaptive);
        }

        if self.session_start.elapsed() > SUSTAINED_SESSION_THRESHOLD {
            delay = delay.mul_f64(SUSTAINED_SESSION_MULTIPLIER);
        }

        delay
    }

    /// Exponential backoff between retry attempts, bounded by `max_delay`.
    pub fn backoff(&self, current: Duration) -> Duration {
        current
            .mul_f64(self.policy.backoff_factor)
            .min(self.policy.max_delay)
    }

    /// Amplified penalty applied on throttling status codes, bounded by
    /// `max_delay`.
    pub fn amplify(&self, current: Duration, factor: f64) -> Duration {
        current.mul_f64(factor).min(self.policy.max_delay)
    }

    /// Records one sent request. Logs the session rate every 25th request.
    pub fn record_request(&mut self) {
        self.request_count += 1;

        if self.request_count % 25 == 0 {
            let elapsed = self.session_start.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                self.request_count as f64 / elapsed
            } else {
                0.0
            };
            tracing::info!(
                "Made {} requests in {:.1}s, avg rate: {:.2} req/s",
                self.request_count,
                elapsed,
                rate
            );
        }
    }

    /// Pretends the session started `age` ago (test hook for the sustained
    /// session penalty).
    #[cfg(test)]
    pub fn backdate_session(&mut self, age: Duration) {
        if let Some(start) = Instant::now().checked_sub(age) {
            self.session_start = start;
        }
    }

    /// Pretends `count` requests have already been recorded (test hook for
    /// adaptive throttling).
    #[cfg(test)]
    pub fn preload_requests(&mut self, count: u64) {
        self.request_count = count;
    }
}
