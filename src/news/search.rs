//! Paginated news search
//!
//! One query is run against every time-range window in order, and each window
//! is paged by `start` offset until a short batch signals exhaustion. Window
//! failures degrade: an error inside one window abandons that window and
//! moves to the next. The fetcher's session pacing applies between every
//! request.

use crate::fetch::Fetcher;
use crate::news::parse::parse_articles;
use crate::news::{dedupe_articles, encode_query, locale_params, NewsArticle};
use crate::ExtractError;

/// Host serving the news listing
pub const NEWS_HOST: &str = "https://news.google.com";

/// Time-range windows tried in order: query modifier and row annotation
const TIME_RANGES: &[(&str, &str)] = &[
    ("", "all_time"),
    ("&when:1d", "1d"),
    ("&when:7d", "7d"),
    ("&when:1m", "1m"),
    ("&when:1y", "1y"),
];

/// Rows per listing page; a shorter batch means the window is exhausted
const PAGE_SIZE: usize = 10;

/// Highest `start` offset tried per window
const MAX_START: usize = 100;

/// Hard cap on collected rows, regardless of the requested maximum
const ARTICLE_CAP: usize = 500;

/// Searches the news listing for `query`, collecting up to `max_articles`
/// deduplicated rows.
pub async fn search_news(
    fetcher: &mut Fetcher,
    query: &str,
    country: &str,
    max_articles: usize,
) -> crate::Result<Vec<NewsArticle>> {
    search_news_with_host(fetcher, NEWS_HOST, query, country, max_articles).await
}

/// [`search_news`] against an explicit listing host.
pub async fn search_news_with_host(
    fetcher: &mut Fetcher,
    host: &str,
    query: &str,
    country: &str,
    max_articles: usize,
) -> crate::Result<Vec<NewsArticle>> {
    let locale = locale_params(country);
    let encoded = encode_query(query);
    let target = max_articles.min(ARTICLE_CAP);
    let mut collected: Vec<NewsArticle> = Vec::new();

    'windows: for (modifier, window_name) in TIME_RANGES {
        if collected.len() >= target {
            break;
        }
        tracing::info!("Searching news window '{}' for '{}'", window_name, query);

        for start in (0..MAX_START).step_by(PAGE_SIZE) {
            if collected.len() >= target {
                break 'windows;
            }

            let mut url = format!(
                "{}/search?q={}{}&hl={}&gl={}&ceid={}",
                host, encoded, modifier, locale.hl, locale.gl, locale.ceid
            );
            if start > 0 {
                url.push_str(&format!("&start={}", start));
            }

            let page = match fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(ExtractError::Cancelled) => return Err(ExtractError::Cancelled),
                Err(e) => {
                    tracing::warn!("News window '{}' failed, moving on: {}", window_name, e);
                    continue 'windows;
                }
            };

            let parsed = parse_articles(&page.body, host);
            if parsed.is_empty() {
                break;
            }

            let batch_len = parsed.len();
            let room = target - collected.len();
            collected.extend(parsed.into_iter().take(room).map(|article| NewsArticle {
                title: article.title,
                source: article.source,
                time: article.time,
                author: article.author,
                link: article.link,
                time_range: window_name.to_string(),
                page: start / PAGE_SIZE + 1,
            }));

            if batch_len < PAGE_SIZE {
                break;
            }
        }
    }

    let articles = dedupe_articles(collected);
    tracing::info!("News search yielded {} unique articles", articles.len());
    Ok(articles)
}

// Window iteration, pagination cutoff, and failure degradation are covered by
// the wiremock integration tests; the pure pieces are tested in the parent
// module and in `parse`.
