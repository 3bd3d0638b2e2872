//! Item listing retrieval and time-window filtering
//!
//! The listing endpoint only understands coarse time ranges (week, month,
//! year), so retrieval asks for the smallest range covering the configured
//! window and the exact window is re-applied client-side afterwards.

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::model::{coarse_time_range, ListingItem, Sort};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

/// Fetches up to `limit` items for `source` in the given sort order.
pub async fn fetch_listing(
    fetcher: &mut Fetcher,
    config: &Config,
    source: &str,
    sort: Sort,
    window_days: u32,
    limit: usize,
) -> crate::Result<Vec<ListingItem>> {
    let mut url = format!(
        "{}/r/{}/{}.json?limit={}",
        config.source.canonical_host,
        source,
        sort.as_str(),
        limit
    );
    if sort.takes_time_range() {
        url.push_str("&t=");
        url.push_str(coarse_time_range(window_days));
    }

    tracing::info!("Fetching {} listing for r/{} (limit {})", sort, source, limit);
    let payload = fetcher.fetch_json(&url, 1.0).await?;
    let items = parse_listing(&payload, &config.source.canonical_host);
    tracing::info!("Listing returned {} items", items.len());
    Ok(items)
}

/// Parses the listing payload into items. Entries that are not items
/// (`kind != "t3"`) are skipped.
pub fn parse_listing(payload: &Value, canonical_host: &str) -> Vec<ListingItem> {
    let children = payload
        .get("data")
        .and_then(|data| data.get("children"))
        .and_then(Value::as_array);

    let Some(children) = children else {
        tracing::warn!("Listing payload has no children array");
        return Vec::new();
    };

    children
        .iter()
        .filter(|child| child.get("kind").and_then(Value::as_str) == Some("t3"))
        .filter_map(|child| child.get("data"))
        .map(|data| {
            let created_utc = data.get("created_utc").and_then(Value::as_f64).map(|s| s as i64);
            let created_time =
                created_utc.and_then(|secs| Utc.timestamp_opt(secs, 0).single());
            let url = data
                .get("permalink")
                .and_then(Value::as_str)
                .map(|permalink| format!("{}{}", canonical_host, permalink))
                .unwrap_or_default();

            ListingItem {
                id: str_field(data, "id"),
                title: str_field(data, "title"),
                author: str_field(data, "author"),
                score: data.get("score").and_then(Value::as_i64).unwrap_or(0),
                num_comments: data.get("num_comments").and_then(Value::as_i64).unwrap_or(0),
                created_utc,
                created_time,
                url,
                subreddit: str_field(data, "subreddit"),
                selftext: str_field(data, "selftext"),
                domain: str_field(data, "domain"),
                upvote_ratio: data.get("upvote_ratio").and_then(Value::as_f64).unwrap_or(0.0),
                ..ListingItem::default()
            }
        })
        .collect()
}

/// Drops items older than `window_days`. Items without a usable timestamp
/// are dropped too, since their recency cannot be established.
pub fn filter_by_window(items: Vec<ListingItem>, window_days: u32) -> Vec<ListingItem> {
    let cutoff = Utc::now() - Duration::days(i64::from(window_days));
    let before = items.len();

    let kept: Vec<ListingItem> = items
        .into_iter()
        .filter(|item| item.created_time.map(|t| t >= cutoff).unwrap_or(false))
        .collect();

    tracing::info!(
        "Time window filter: {} of {} items within the last {} days",
        kept.len(),
        before,
        window_days
    );
    kept
}

fn str_field(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
