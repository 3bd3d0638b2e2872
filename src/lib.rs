//! Threadsift: a discussion-thread and news-listing content extractor
//!
//! This crate extracts posts and nested comment trees from an uncooperative
//! discussion source (rendered markup with a JSON API fallback) and listing
//! results from a news search source, producing normalized, deduplicated
//! records while pacing its requests to avoid block-listing.
#![recursion_limit = "256"]

pub mod config;
pub mod crawl;
pub mod fetch;
pub mod model;
pub mod news;
pub mod parse;
pub mod pipeline;
pub mod text;

use thiserror::Error;

/// Main error type for threadsift operations
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Exhausted {attempts} retry attempts for {url}")]
    ExhaustedRetries { url: String, attempts: u32 },

    #[error("Listing unavailable for {source_name}: {message}")]
    ListingUnavailable {
        source_name: String,
        message: String,
    },

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Whether this error should be recorded on the failing item rather than
    /// abort a listing run.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            ExtractError::Http { .. }
                | ExtractError::HttpStatus { .. }
                | ExtractError::Timeout { .. }
                | ExtractError::ExhaustedRetries { .. }
                | ExtractError::Json(_)
                | ExtractError::UrlParse(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for threadsift operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetch::{Fetcher, RateLimiter, RetryPolicy};
pub use model::{Comment, ExtractionResult, ListingExtraction, ListingItem, PostInfo, RunSummary};
