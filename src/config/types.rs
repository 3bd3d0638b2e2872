use serde::Deserialize;

/// Main configuration structure for threadsift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            crawl: CrawlConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

/// Fetch pacing and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Base delay before each request (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on any computed backoff delay (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay between retry attempts
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Maximum number of attempts per fetch
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
            retry_attempts: default_retry_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Listing-mode crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of listing items to process per run
    #[serde(rename = "max-items", default = "default_max_items")]
    pub max_items: usize,

    /// Maximum number of comments retained per item
    #[serde(rename = "max-comments-per-item", default = "default_max_comments_per_item")]
    pub max_comments_per_item: usize,

    /// Recency window applied to the retrieved listing (days)
    #[serde(rename = "time-window-days", default = "default_time_window_days")]
    pub time_window_days: u32,

    /// Base inter-item delay; grows with loop index (milliseconds)
    #[serde(rename = "item-delay-base-ms", default = "default_item_delay_base_ms")]
    pub item_delay_base_ms: u64,

    /// Cap on the inter-item delay (milliseconds)
    #[serde(rename = "item-delay-cap-ms", default = "default_item_delay_cap_ms")]
    pub item_delay_cap_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            max_comments_per_item: default_max_comments_per_item(),
            time_window_days: default_time_window_days(),
            item_delay_base_ms: default_item_delay_base_ms(),
            item_delay_cap_ms: default_item_delay_cap_ms(),
        }
    }
}

/// Discussion-source host configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Canonical host serving the modern rendered pages and the JSON API
    #[serde(rename = "canonical-host", default = "default_canonical_host")]
    pub canonical_host: String,

    /// Legacy host whose markup rendition carries the full comment tree
    #[serde(rename = "legacy-host", default = "default_legacy_host")]
    pub legacy_host: String,

    /// Fixed identity header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            canonical_host: default_canonical_host(),
            legacy_host: default_legacy_host(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    3_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_retry_attempts() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_items() -> usize {
    500
}

fn default_max_comments_per_item() -> usize {
    5_000
}

fn default_time_window_days() -> u32 {
    7
}

fn default_item_delay_base_ms() -> u64 {
    4_000
}

fn default_item_delay_cap_ms() -> u64 {
    15_000
}

fn default_canonical_host() -> String {
    "https://www.reddit.com".to_string()
}

fn default_legacy_host() -> String {
    "https://old.reddit.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/96.0.4664.45 Safari/537.36"
        .to_string()
}
