//! News-listing extraction
//!
//! A second instantiation of the fetch/paginate/dedup pattern, against a
//! query-driven news search listing. Retrieval walks an ordered set of
//! time-range windows with offset pagination ([`search`]); parsing reads
//! positional text lines off each `<article>` element ([`parse`]).

pub mod parse;
pub mod search;

pub use search::search_news;

use serde::Serialize;
use std::collections::HashSet;

/// Placeholder for fields the listing did not render
pub const MISSING: &str = "Missing";

/// One article row from the news listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub time: String,
    pub author: String,
    pub link: String,

    /// Which time-range window retrieved this row (`all_time`, `1d`, ...)
    pub time_range: String,

    /// 1-based page within that window
    pub page: usize,
}

/// Locale parameters attached to every search request.
#[derive(Debug, Clone, Copy)]
pub struct Locale {
    pub hl: &'static str,
    pub gl: &'static str,
    pub ceid: &'static str,
}

/// Locale parameters for a country code. Unknown codes fall back to US.
pub fn locale_params(country: &str) -> Locale {
    let (hl, gl, ceid) = match country.to_ascii_uppercase().as_str() {
        "IT" => ("it-IT", "IT", "IT%3Ait"),
        "UK" => ("en-GB", "GB", "GB%3Aen"),
        "DE" => ("de-DE", "DE", "DE%3Ade"),
        "FR" => ("fr-FR", "FR", "FR%3Afr"),
        "ES" => ("es-ES", "ES", "ES%3Aes"),
        "CA" => ("en-CA", "CA", "CA%3Aen"),
        "AU" => ("en-AU", "AU", "AU%3Aen"),
        "JP" => ("ja-JP", "JP", "JP%3Aja"),
        "BR" => ("pt-BR", "BR", "BR%3Apt"),
        "IN" => ("en-IN", "IN", "IN%3Aen"),
        "RU" => ("ru-RU", "RU", "RU%3Aru"),
        "CN" => ("zh-CN", "CN", "CN%3Azh"),
        _ => ("en-US", "US", "US%3Aen"),
    };
    Locale { hl, gl, ceid }
}

/// Percent-encodes the query the way the listing expects: lowercased, with
/// only the characters the search form itself escapes.
pub fn encode_query(query: &str) -> String {
    query
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '&' => "%26".to_string(),
            '=' => "%3D".to_string(),
            '+' => "%2B".to_string(),
            ' ' => "%20".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Removes rows duplicating an earlier (title, link) pair.
pub fn dedupe_articles(articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert((article.title.clone(), article.link.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_params_known_and_fallback() {
        assert_eq!(locale_params("it").hl, "it-IT");
        assert_eq!(locale_params("JP").ceid, "JP%3Aja");
        assert_eq!(locale_params("XX").gl, "US");
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query("Rust + WebAssembly"), "rust%20%2B%20webassembly");
        assert_eq!(encode_query("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let row = |title: &str, link: &str, page: usize| NewsArticle {
            title: title.to_string(),
            source: "Src".to_string(),
            time: "1h".to_string(),
            author: "A".to_string(),
            link: link.to_string(),
            time_range: "all_time".to_string(),
            page,
        };

        let deduped = dedupe_articles(vec![
            row("T1", "L1", 1),
            row("T1", "L1", 2),
            row("T1", "L2", 1),
        ]);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].page, 1);
    }
}
