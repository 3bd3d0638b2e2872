//! Record types produced by the extraction pipeline
//!
//! All types here are value-like: parsers and the orchestrator hand them to
//! the caller by value and nothing retains shared mutable state afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Author sentinel used when the source reports no author
pub const UNKNOWN_AUTHOR: &str = "[unknown]";

/// Author sentinel applied by the dedup pipeline to empty author fields
pub const DELETED_AUTHOR: &str = "[deleted]";

/// A single comment, flattened for tabular consumption.
///
/// `depth` is 0 for top-level comments; a comment whose `parent_id` names
/// another comment in the same set always has that comment's depth plus one.
/// `comment_id` is never empty: when the source assigns no identifier one is
/// synthesized as `comment_<ordinal>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Comment {
    pub comment_id: String,

    /// None marks a top-level comment
    pub parent_id: Option<String>,

    pub author: String,
    pub author_id: Option<String>,
    pub subreddit: Option<String>,

    /// Permalink to this comment on the canonical host
    pub link: Option<String>,

    /// Creation timestamp as the source reported it (epoch seconds or an
    /// ISO-style string); parsed to `created_utc` by the dedup pipeline
    pub created_time: Option<String>,

    /// Canonical creation instant; None when the source value is unparseable
    pub created_utc: Option<DateTime<Utc>>,

    /// Body text as extracted from the source
    pub body_raw: String,

    /// Normalized body (accents stripped, punctuation collapsed)
    pub body: String,

    /// Lemmatized body. Derived by an external collaborator, never set here.
    pub body_processed: Option<String>,

    pub score: i64,
    pub depth: u32,

    /// Number of descendant comments actually emitted beneath this one
    pub reply_count: u32,

    // Parent-item denormalization, attached by the orchestrator in listing
    // mode so each comment row carries its post context.
    pub post_id: Option<String>,
    pub post_title: Option<String>,
    pub post_score: Option<i64>,
    pub post_author: Option<String>,
    pub post_created_utc: Option<i64>,
}

/// Post metadata parsed from a rendered item page. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostInfo {
    pub author: Option<String>,
    pub author_id: Option<String>,
    pub author_profile: Option<String>,
    pub subreddit: Option<String>,
    pub post_id: Option<String>,
    pub title: String,
    pub label: Option<String>,
    pub publishing_date: Option<String>,

    /// Canonical link: widget value, then `<link rel=canonical>`, then the
    /// request URL
    pub post_link: String,

    pub comment_count: Option<i64>,
    pub upvote_count: Option<i64>,
    pub attachment_type: Option<String>,
    pub attachment_link: Option<String>,
}

/// One entry from a paginated item listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingItem {
    pub id: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub num_comments: i64,
    pub created_utc: Option<i64>,
    pub created_time: Option<DateTime<Utc>>,
    pub url: String,
    pub subreddit: String,
    pub selftext: String,
    pub domain: String,
    pub upvote_ratio: f64,

    // Extraction outcome, appended by the orchestrator's per-item loop.
    pub comments_extracted: usize,
    pub extraction_success: bool,
    pub error: Option<String>,
}

/// Result of single-item extraction
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionResult {
    pub info: PostInfo,
    pub comments: Vec<Comment>,
}

/// Result of a listing-mode extraction run.
///
/// A total failure to retrieve the initial listing yields empty sequences, no
/// summary, and a populated `error`; per-item failures are recorded on the
/// items themselves and never surface here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingExtraction {
    pub items: Vec<ListingItem>,
    pub comments: Vec<Comment>,
    pub summary: Option<RunSummary>,
    pub error: Option<String>,
}

/// Aggregate counters for one listing run. Created once at the end of the
/// run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub items_found: usize,
    pub items_processed: usize,
    pub total_comments: usize,
    pub time_window_days: u32,
    pub sort: Sort,
    pub completed_at: DateTime<Utc>,
}

/// Listing sort order requested from the discussion source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Hot,
    New,
    Top,
    Controversial,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Hot => "hot",
            Sort::New => "new",
            Sort::Top => "top",
            Sort::Controversial => "controversial",
        }
    }

    /// Whether this sort takes a `t` (time range) query parameter
    pub fn takes_time_range(&self) -> bool {
        matches!(self, Sort::Top | Sort::Controversial)
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hot" => Ok(Sort::Hot),
            "new" => Ok(Sort::New),
            "top" => Ok(Sort::Top),
            "controversial" => Ok(Sort::Controversial),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarsens an exact day window to the time-range token the listing endpoint
/// understands. The exact window is re-applied client-side after retrieval.
pub fn coarse_time_range(window_days: u32) -> &'static str {
    if window_days <= 7 {
        "week"
    } else if window_days <= 30 {
        "month"
    } else {
        "year"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_round_trip() {
        for s in ["hot", "new", "top", "controversial"] {
            let sort: Sort = s.parse().unwrap();
            assert_eq!(sort.as_str(), s);
        }
        assert!("best".parse::<Sort>().is_err());
    }

    #[test]
    fn test_sort_time_range_param() {
        assert!(Sort::Top.takes_time_range());
        assert!(Sort::Controversial.takes_time_range());
        assert!(!Sort::Hot.takes_time_range());
        assert!(!Sort::New.takes_time_range());
    }

    #[test]
    fn test_coarse_time_range() {
        assert_eq!(coarse_time_range(3), "week");
        assert_eq!(coarse_time_range(7), "week");
        assert_eq!(coarse_time_range(14), "month");
        assert_eq!(coarse_time_range(30), "month");
        assert_eq!(coarse_time_range(90), "year");
    }
}
