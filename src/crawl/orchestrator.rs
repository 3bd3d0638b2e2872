//! Listing-mode run driver
//!
//! Walks a source's item listing through a fixed sequence of phases:
//! retrieve, filter by time window, process each item, summarize. Item
//! failures are isolated: an error while extracting one item is recorded on
//! that item and the loop moves on. Only failure to retrieve the listing
//! itself aborts the run, and even that surfaces as a populated `error` field
//! rather than an `Err`.

use crate::config::Config;
use crate::crawl::listing::{fetch_listing, filter_by_window};
use crate::crawl::post::extract_post;
use crate::fetch::Fetcher;
use crate::model::{Comment, ExtractionResult, ListingExtraction, ListingItem, RunSummary, Sort};
use crate::ExtractError;
use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Listing items requested per run, regardless of configuration
const LISTING_FETCH_CAP: usize = 500;

/// The listing is over-fetched by this factor so the time-window filter
/// still leaves enough items
const OVERFETCH_FACTOR: usize = 2;

/// Increment added to the inter-item delay per processed item
const ITEM_DELAY_STEP: Duration = Duration::from_millis(500);

/// An extended pause is taken after this many items
const EXTENDED_PAUSE_EVERY: usize = 10;

/// The extended pause is this many base delays long
const EXTENDED_PAUSE_FACTOR: u32 = 5;

/// Ordering requested for each item's comments during a listing run
const ITEM_COMMENT_SORT: Sort = Sort::Top;

type ProgressFn = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Drives extraction runs against one source.
///
/// Owns the [`Fetcher`] for the run, so all pacing state is scoped to one
/// orchestrator instance.
pub struct Orchestrator<'a> {
    config: &'a Config,
    fetcher: Fetcher,
    cancel: CancellationToken,
    progress: Option<ProgressFn>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config, cancel: CancellationToken) -> crate::Result<Self> {
        let fetcher = Fetcher::new(config, cancel.clone())?;
        Ok(Self {
            config,
            fetcher,
            cancel,
            progress: None,
        })
    }

    /// Installs a progress callback, invoked with a completion fraction in
    /// `[0, 1]` and a human-readable status message.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64, &str) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    fn report(&self, fraction: f64, message: &str) {
        if let Some(callback) = &self.progress {
            callback(fraction, message);
        }
    }

    /// Extracts a single item by URL, with comments in `sort` order.
    pub async fn run_post(&mut self, url: &str, sort: Sort) -> crate::Result<ExtractionResult> {
        extract_post(&mut self.fetcher, self.config, url, sort).await
    }

    /// Runs a full listing-mode extraction for `source`.
    pub async fn run_listing(&mut self, source: &str, sort: Sort) -> ListingExtraction {
        let window_days = self.config.crawl.time_window_days;
        let fetch_limit =
            (self.config.crawl.max_items * OVERFETCH_FACTOR).min(LISTING_FETCH_CAP);

        self.report(0.05, "Retrieving listing");
        let listing = match fetch_listing(
            &mut self.fetcher,
            self.config,
            source,
            sort,
            window_days,
            fetch_limit,
        )
        .await
        {
            Ok(listing) => listing,
            Err(e) => {
                let err = ExtractError::ListingUnavailable {
                    source_name: source.to_string(),
                    message: e.to_string(),
                };
                tracing::error!("{}", err);
                return ListingExtraction {
                    error: Some(err.to_string()),
                    ..ListingExtraction::default()
                };
            }
        };
        self.report(0.15, "Filtering by time window");
        let mut items = filter_by_window(listing, window_days);
        items.truncate(self.config.crawl.max_items);

        // Counters follow the run's observable scope: found is what survived
        // the window filter and cap, processed is every item attempted.
        let items_found = items.len();
        let mut items_processed = 0usize;
        let mut comments: Vec<Comment> = Vec::new();
        let total = items.len();

        for (index, item) in items.iter_mut().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!("Run cancelled after {} of {} items", index, total);
                break;
            }

            self.report(
                0.2 + 0.7 * (index + 1) as f64 / total.max(1) as f64,
                &format!(
                    "Processing item {}/{}: {:.40}",
                    index + 1,
                    total,
                    item.title
                ),
            );

            match extract_post(&mut self.fetcher, self.config, &item.url, ITEM_COMMENT_SORT).await
            {
                Ok(mut result) => {
                    result
                        .comments
                        .truncate(self.config.crawl.max_comments_per_item);
                    tag_comments(&mut result.comments, item);
                    item.comments_extracted = result.comments.len();
                    item.extraction_success = true;
                    comments.extend(result.comments);
                }
                Err(ExtractError::Cancelled) => {
                    tracing::warn!("Run cancelled while processing item {}", item.id);
                    break;
                }
                Err(e) => {
                    if e.is_item_level() {
                        tracing::warn!("Item {} failed, continuing: {}", item.id, e);
                    } else {
                        tracing::error!("Unexpected failure on item {}: {}", item.id, e);
                    }
                    item.extraction_success = false;
                    item.error = Some(e.to_string());
                }
            }

            items_processed += 1;

            if index + 1 < total {
                let delay = self.inter_item_delay(index);
                tracing::debug!("Inter-item delay {:.1}s", delay.as_secs_f64());
                tokio::time::sleep(delay).await;

                if (index + 1) % EXTENDED_PAUSE_EVERY == 0 {
                    let pause = Duration::from_millis(self.config.crawl.item_delay_base_ms)
                        * EXTENDED_PAUSE_FACTOR;
                    tracing::info!(
                        "Extended pause after {} items: {:.1}s",
                        index + 1,
                        pause.as_secs_f64()
                    );
                    tokio::time::sleep(pause).await;
                }
            }
        }

        self.report(0.95, "Summarizing");
        let summary = RunSummary {
            source: source.to_string(),
            items_found,
            items_processed,
            total_comments: comments.len(),
            time_window_days: window_days,
            sort,
            completed_at: Utc::now(),
        };
        tracing::info!(
            "Run complete: {}/{} items processed, {} comments, {} requests",
            items_processed,
            total,
            comments.len(),
            self.fetcher.request_count()
        );

        self.report(1.0, "Done");
        ListingExtraction {
            items,
            comments,
            summary: Some(summary),
            error: None,
        }
    }

    /// Inter-item delay, growing with the loop index up to the configured cap
    fn inter_item_delay(&self, index: usize) -> Duration {
        let grown = self.config.crawl.item_delay_base_ms
            + ITEM_DELAY_STEP.as_millis() as u64 * index as u64;
        Duration::from_millis(grown.min(self.config.crawl.item_delay_cap_ms))
    }
}

/// Denormalizes the parent item onto each comment row.
fn tag_comments(comments: &mut [Comment], item: &ListingItem) {
    for comment in comments {
        comment.post_id = Some(item.id.clone());
        comment.post_title = Some(item.title.clone());
        comment.post_score = Some(item.score);
        comment.post_author = Some(item.author.clone());
        comment.post_created_utc = item.created_utc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_inter_item_delay_grows_to_cap() {
        let mut config = Config::default();
        config.crawl.item_delay_base_ms = 4_000;
        config.crawl.item_delay_cap_ms = 6_000;
        let orchestrator =
            Orchestrator::new(&config, CancellationToken::new()).unwrap();

        assert_eq!(orchestrator.inter_item_delay(0), Duration::from_millis(4_000));
        assert_eq!(orchestrator.inter_item_delay(2), Duration::from_millis(5_000));
        // Capped from index 4 onward
        assert_eq!(orchestrator.inter_item_delay(10), Duration::from_millis(6_000));
    }

    #[test]
    fn test_tag_comments() {
        let item = ListingItem {
            id: "p1".to_string(),
            title: "A title".to_string(),
            author: "alice".to_string(),
            score: 42,
            created_utc: Some(1709287200),
            ..ListingItem::default()
        };
        let mut comments = vec![Comment::default(), Comment::default()];

        tag_comments(&mut comments, &item);

        for comment in &comments {
            assert_eq!(comment.post_id.as_deref(), Some("p1"));
            assert_eq!(comment.post_title.as_deref(), Some("A title"));
            assert_eq!(comment.post_score, Some(42));
            assert_eq!(comment.post_author.as_deref(), Some("alice"));
            assert_eq!(comment.post_created_utc, Some(1709287200));
        }
    }

    // End-to-end run behavior (isolation, fatal listing failure) is covered
    // by the wiremock integration tests.
}
