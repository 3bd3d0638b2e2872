//! Positional parsing of news listing markup
//!
//! The listing renders each result as an `<article>` with no stable classes
//! or attributes, so fields are read by position from the element's text
//! lines: source first, title third, timestamp fourth, byline fifth. Absent
//! positions degrade to the `Missing` placeholder.

use crate::news::MISSING;
use scraper::{Html, Selector};

/// Fields read off one `<article>` element, before window/page annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticle {
    pub title: String,
    pub source: String,
    pub time: String,
    pub author: String,
    pub link: String,
}

/// Index of each field in the article's text lines
const SOURCE_LINE: usize = 0;
const TITLE_LINE: usize = 2;
const TIME_LINE: usize = 3;
const AUTHOR_LINE: usize = 4;

/// Parses all article elements out of a listing page. An empty result means
/// the page (or the window) is exhausted.
pub fn parse_articles(html: &str, listing_host: &str) -> Vec<ParsedArticle> {
    let document = Html::parse_document(html);
    let Ok(article_selector) = Selector::parse("article") else {
        return Vec::new();
    };
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&article_selector)
        .map(|article| {
            let link = article
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| absolutize_link(href, listing_host))
                .unwrap_or_else(|| MISSING.to_string());

            let lines: Vec<&str> = article
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();

            ParsedArticle {
                title: line(&lines, TITLE_LINE),
                source: line(&lines, SOURCE_LINE),
                time: line(&lines, TIME_LINE),
                author: byline_author(&lines),
                link,
            }
        })
        .collect()
}

/// Article links come back relative (`./articles/...`); rewrite them onto
/// the listing host.
fn absolutize_link(href: &str, listing_host: &str) -> String {
    match href.strip_prefix("./articles/") {
        Some(rest) => format!("{}/articles/{}", listing_host, rest),
        None => href.to_string(),
    }
}

fn line(lines: &[&str], index: usize) -> String {
    lines
        .get(index)
        .map(|l| l.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// The byline line reads "By <name>"; anything after the last "By " is the
/// author.
fn byline_author(lines: &[&str]) -> String {
    match lines.get(AUTHOR_LINE) {
        Some(byline) => byline
            .rsplit("By ")
            .next()
            .unwrap_or(byline)
            .to_string(),
        None => MISSING.to_string(),
    }
}
