//! Post metadata extraction from the rendered item page
//!
//! Reads a fixed set of attribute and text locations off the page's post
//! widget. Absent locations degrade to `None` or empty defaults; this parser
//! never fails.

use crate::model::PostInfo;
use crate::parse::strategy::SelectorChain;
use crate::text;
use scraper::{ElementRef, Html, Selector};

/// Parses post metadata from rendered markup.
///
/// The canonical link is resolved first-match-wins: the canonical-URL widget
/// value, then `<link rel="canonical">`, then the request URL itself.
///
/// # Arguments
///
/// * `html` - The rendered page markup
/// * `request_url` - The URL the page was fetched from
/// * `canonical_host` - Host used to build the author profile link
pub fn parse_post_info(html: &str, request_url: &str, canonical_host: &str) -> PostInfo {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let post = Selector::parse("shreddit-post")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    let author = post.and_then(|p| attr(p, "author"));
    let author_profile = author
        .as_ref()
        .map(|a| format!("{}/user/{}", canonical_host, a));

    let label_chain = SelectorChain::new(&["faceplate-tracker[source=\"post\"] a span div"]);
    let label = text::normalize_opt(label_chain.first_text(root).as_deref());

    let link_chain = SelectorChain::new(&["shreddit-canonical-url-updater"]);
    let canonical_chain = SelectorChain::new(&["link[rel=\"canonical\"]"]);
    let post_link = link_chain
        .first_attr(root, "value")
        .or_else(|| canonical_chain.first_attr(root, "href"))
        .unwrap_or_else(|| request_url.to_string());

    PostInfo {
        author_id: post.and_then(|p| attr(p, "author-id")),
        author_profile,
        subreddit: post.and_then(|p| attr(p, "subreddit-prefixed-name")),
        post_id: post.and_then(|p| attr(p, "id")),
        title: post
            .and_then(|p| attr(p, "post-title"))
            .map(|t| text::normalize(&t))
            .unwrap_or_default(),
        label,
        publishing_date: post.and_then(|p| attr(p, "created-timestamp")),
        post_link,
        comment_count: post.and_then(|p| attr(p, "comment-count")).and_then(|v| v.parse().ok()),
        upvote_count: post.and_then(|p| attr(p, "score")).and_then(|v| v.parse().ok()),
        attachment_type: post.and_then(|p| attr(p, "post-type")),
        attachment_link: post.and_then(|p| attr(p, "content-href")),
        author,
    }
}

fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
