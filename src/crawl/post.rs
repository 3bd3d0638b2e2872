//! Single-item extraction
//!
//! One item is extracted in up to three fetches: the rendered page for post
//! metadata, the legacy-host rendition for the comment tree, and, when the
//! markup recovered suspiciously few comments, the JSON payload as a second
//! opinion. The fuller rendition wins, and the result goes through the dedup
//! pipeline before being returned.

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::model::{ExtractionResult, Sort};
use crate::parse::{parse_comments, parse_json_comments, parse_post_info};
use crate::pipeline::{choose_comments, process_comments};
use crate::ExtractError;

/// Below this many markup comments the JSON rendition is also consulted
const JSON_FALLBACK_THRESHOLD: usize = 10;

/// Comment listing depth requested from the source
const COMMENT_LIMIT: usize = 5_000;

/// Extracts post metadata and the full comment tree for one item URL, with
/// comments requested in `sort` order.
///
/// Failure to fetch the rendered page fails the whole item. Failures on the
/// comment fetches degrade instead: whatever rendition was recovered is used,
/// down to an empty comment set.
pub async fn extract_post(
    fetcher: &mut Fetcher,
    config: &Config,
    url: &str,
    sort: Sort,
) -> crate::Result<ExtractionResult> {
    tracing::info!("Extracting item {}", url);

    let page = fetcher.fetch(url).await?;
    let info = parse_post_info(&page.body, url, &config.source.canonical_host);

    let markup_url = comment_page_url(&to_legacy_url(url, config), sort);
    let markup = match fetcher.fetch_with_multiplier(&markup_url, 1.5).await {
        Ok(page) => parse_comments(&page.body, &markup_url, &config.source.canonical_host),
        Err(ExtractError::Cancelled) => return Err(ExtractError::Cancelled),
        Err(e) => {
            tracing::warn!("Markup comment fetch failed for {}: {}", markup_url, e);
            Vec::new()
        }
    };

    let comments = if markup.len() < JSON_FALLBACK_THRESHOLD {
        tracing::info!(
            "Markup recovered only {} comments, consulting JSON payload",
            markup.len()
        );
        let json_url = with_limit(&format!("{}.json", url.trim_end_matches('/')), COMMENT_LIMIT);
        match fetcher.fetch_json(&json_url, 2.0).await {
            Ok(payload) => {
                let api = parse_json_comments(&payload, &config.source.canonical_host);
                choose_comments(markup, api)
            }
            Err(ExtractError::Cancelled) => return Err(ExtractError::Cancelled),
            Err(e) => {
                tracing::warn!("JSON comment fetch failed for {}: {}", json_url, e);
                markup
            }
        }
    } else {
        markup
    };

    let comments = process_comments(comments);
    tracing::info!("Item yielded {} comments after processing", comments.len());

    Ok(ExtractionResult { info, comments })
}

/// Rewrites a canonical-host URL onto the legacy host, whose markup rendition
/// carries the full comment tree. Other hosts pass through unchanged.
pub fn to_legacy_url(url: &str, config: &Config) -> String {
    match url.strip_prefix(config.source.canonical_host.as_str()) {
        Some(rest) => format!("{}{}", config.source.legacy_host, rest),
        None => url.to_string(),
    }
}

/// Markup comment page URL: the requested ordering travels as a query
/// parameter alongside the comment limit.
fn comment_page_url(url: &str, sort: Sort) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}sort={}&limit={}", url, separator, sort, COMMENT_LIMIT)
}

fn with_limit(url: &str, limit: usize) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}limit={}", url, separator, limit)
}
