//! Comment tree extraction from rendered markup
//!
//! The markup rendition nests replies inside their parent's container, but
//! the class and attribute vocabulary varies across layouts, so every lookup
//! runs through an ordered fallback chain. The tree is flattened into
//! depth-annotated records by an explicit work-stack traversal; a shared
//! visited-node set keeps overlapping fallback queries from emitting the same
//! underlying node twice.

use crate::model::{Comment, UNKNOWN_AUTHOR};
use crate::parse::strategy::SelectorChain;
use crate::text;
use scraper::{ElementRef, Html};
use std::collections::{HashMap, HashSet};

/// Nesting levels beyond which replies are not followed
const MAX_REPLY_DEPTH: u32 = 15;

/// Minimum length for a text fragment to count in the body heuristic
const HEURISTIC_MIN_LEN: usize = 10;

/// Number of fragments the body heuristic joins
const HEURISTIC_TAKE: usize = 3;

/// UI labels that disqualify a text fragment from the body heuristic
const UI_STOPWORDS: &[&str] = &[
    "reply",
    "permalink",
    "save",
    "report",
    "give award",
    "share",
    "level 1",
    "level 2",
    "level 3",
    "points",
    "point",
    "hour ago",
    "hours ago",
    "day ago",
    "days ago",
    "minute ago",
    "minutes ago",
];

/// Parses the full comment tree from rendered markup.
///
/// Comments come back flattened in discovery order, each annotated with its
/// depth and parent identifier. Empty-bodied nodes (deleted or collapsed
/// comments) are skipped along with their whole reply subtree, so every
/// emitted reply has an emitted parent.
///
/// # Arguments
///
/// * `html` - The rendered thread markup
/// * `page_url` - URL the page was fetched from (for the subreddit field)
/// * `canonical_host` - Host used to absolutize permalinks
pub fn parse_comments(html: &str, page_url: &str, canonical_host: &str) -> Vec<Comment> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let top_level_chain = SelectorChain::new(&[
        "div.sitetable.nestedlisting > div[data-type=\"comment\"]",
        "div.sitetable div[data-type=\"comment\"]",
        "div[data-type=\"comment\"]",
        "div.comment",
        "div.Comment",
        "div.thing[data-type=\"comment\"]",
    ]);

    let reply_chain = SelectorChain::new(&[
        "div.child div[data-type=\"comment\"]",
        "div.child div.comment",
        "div[data-type=\"comment\"]",
        "div.comment",
    ]);

    let subreddit = subreddit_from_url(page_url);
    let mut comments: Vec<Comment> = Vec::new();
    let mut visited = HashSet::new();

    // Broad fallback selectors match nested comments too; only nodes with no
    // comment container above them are top level.
    let top_level = top_level_chain.select_first_where(root, |candidate| {
        nearest_container_is(candidate, root)
    });
    tracing::debug!("Found {} top-level comment containers", top_level.len());

    // Explicit work stack instead of call-stack recursion; entries are pushed
    // in reverse so emission follows document order.
    let mut stack: Vec<(ElementRef, Option<String>, u32)> = Vec::new();
    for element in top_level.into_iter().rev() {
        stack.push((element, None, 0));
    }

    while let Some((element, parent_id, depth)) = stack.pop() {
        if !visited.insert(element.id()) {
            continue;
        }

        // A node without a usable body takes its whole reply subtree with it
        let Some(comment_id) = emit_comment(
            element,
            parent_id.as_deref(),
            depth,
            subreddit.as_deref(),
            canonical_host,
            &mut comments,
        ) else {
            continue;
        };

        let next_depth = depth + 1;
        if next_depth > MAX_REPLY_DEPTH {
            tracing::warn!("Reply depth cap reached, not descending further");
            continue;
        }

        let replies =
            reply_chain.select_first_where(element, |candidate| nearest_container_is(candidate, element));
        for reply in replies.into_iter().rev() {
            stack.push((reply, Some(comment_id.clone()), next_depth));
        }
    }

    attach_reply_counts(&mut comments);

    tracing::info!("Extracted {} comments from markup", comments.len());
    comments
}

/// Extracts one comment record from its container element. Returns the
/// emitted comment id, or None when the node has no usable body.
fn emit_comment(
    element: ElementRef<'_>,
    parent_id: Option<&str>,
    depth: u32,
    subreddit: Option<&str>,
    canonical_host: &str,
    comments: &mut Vec<Comment>,
) -> Option<String> {
    let body_raw = extract_body(element)?;
    let body = text::normalize(&body_raw);
    if body.is_empty() {
        return None;
    }

    let comment_id = self_attr(element, "data-fullname")
        .unwrap_or_else(|| format!("comment_{}", comments.len()));

    let author = extract_author(element).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let link = self_attr(element, "data-permalink")
        .map(|permalink| format!("{}{}", canonical_host, permalink));

    tracing::debug!(
        "Markup: found comment {} at depth {}: {:.50}",
        comments.len() + 1,
        depth,
        body
    );

    let comment = Comment {
        comment_id: comment_id.clone(),
        parent_id: parent_id.map(str::to_string),
        author,
        author_id: self_attr(element, "data-author-fullname"),
        subreddit: subreddit.map(str::to_string),
        link,
        created_time: extract_created_time(element),
        created_utc: None,
        body_raw,
        body,
        body_processed: None,
        score: extract_score(element),
        depth,
        reply_count: 0,
        ..Comment::default()
    };

    comments.push(comment);
    Some(comment_id)
}

/// Resolves the comment body through the ordered text chains, falling back to
/// a frequency/length heuristic over all contained text.
fn extract_body(element: ElementRef<'_>) -> Option<String> {
    let body_chain = SelectorChain::new(&[
        "div.md > p",
        "div.usertext-body > div > p",
        "div.usertext-body",
        "div.md",
        "p",
        "div.RichTextJSON-root",
    ]);

    // Body text must belong to this comment, not to a nested reply.
    if let Some(body) = body_chain.first_text_where(element, |candidate| {
        nearest_container_is(candidate, element)
    }) {
        return Some(body);
    }

    // Last resort: sift all contained text, dropping short fragments and
    // common UI labels, and join the first few survivors.
    let fragments: Vec<&str> = element
        .text()
        .map(str::trim)
        .filter(|t| t.len() > HEURISTIC_MIN_LEN)
        .filter(|t| {
            let lower = t.to_lowercase();
            !UI_STOPWORDS.iter().any(|stop| lower.contains(stop))
        })
        .take(HEURISTIC_TAKE)
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(" "))
    }
}

fn extract_author(element: ElementRef<'_>) -> Option<String> {
    if let Some(author) = self_attr(element, "data-author") {
        return Some(author);
    }

    let author_chain = SelectorChain::new(&["a.author"]);
    let href = author_chain.first_attr(element, "href")?;
    if let Some(stripped) = href.strip_prefix("/user/") {
        Some(stripped.trim_end_matches('/').to_string())
    } else {
        Some(href)
    }
}

fn extract_score(element: ElementRef<'_>) -> i64 {
    let likes_chain = SelectorChain::new(&["span.likes"]);
    let score_chain = SelectorChain::new(&["span.score"]);
    let score_div_chain = SelectorChain::new(&["div.score"]);

    let candidates = [
        likes_chain.first_attr(element, "title"),
        score_chain.first_attr(element, "title"),
        score_chain.first_text(element),
        self_attr(element, "data-score"),
        score_div_chain.first_text(element),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

fn extract_created_time(element: ElementRef<'_>) -> Option<String> {
    let datetime_chain = SelectorChain::new(&["time[datetime]"]);
    let title_chain = SelectorChain::new(&["time[title]"]);

    datetime_chain
        .first_attr(element, "datetime")
        .or_else(|| title_chain.first_attr(element, "title"))
        .or_else(|| self_attr(element, "data-timestamp"))
}

fn self_attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Whether `element` is a comment container in any of the known layouts
fn is_comment_container(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("data-type") == Some("comment") {
        return true;
    }
    value
        .attr("class")
        .map(|classes| {
            classes
                .split_whitespace()
                .any(|class| class == "comment" || class == "Comment")
        })
        .unwrap_or(false)
}

/// Whether the nearest comment container above `candidate` (walking up to
/// `owner`) is `owner` itself. Filters broad descendant selectors down to a
/// node's own content and direct replies.
fn nearest_container_is<'a>(candidate: ElementRef<'a>, owner: ElementRef<'a>) -> bool {
    for ancestor in candidate.ancestors() {
        if ancestor.id() == owner.id() {
            return true;
        }
        if let Some(element) = ElementRef::wrap(ancestor) {
            if is_comment_container(&element) {
                return false;
            }
        }
    }
    false
}

/// Computes reply counts bottom-up: each comment's count is the number of
/// emitted descendants beneath it.
pub(crate) fn attach_reply_counts(comments: &mut [Comment]) {
    let id_index: HashMap<String, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.comment_id.clone(), i))
        .collect();

    let mut counts = vec![0u32; comments.len()];
    let mut order: Vec<usize> = (0..comments.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(comments[i].depth));

    for i in order {
        if let Some(parent_id) = &comments[i].parent_id {
            if let Some(&p) = id_index.get(parent_id.as_str()) {
                counts[p] += counts[i] + 1;
            }
        }
    }

    for (i, comment) in comments.iter_mut().enumerate() {
        comment.reply_count = counts[i];
    }
}

fn subreddit_from_url(url: &str) -> Option<String> {
    let after = url.split("/r/").nth(1)?;
    let name = after.split('/').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://www.reddit.com";
    const PAGE: &str = "https://old.reddit.com/r/rust/comments/abc/thread/";

    fn nested_thread() -> &'static str {
        r#"<html><body><div class="sitetable nestedlisting">
          <div class="thing comment" data-type="comment" data-fullname="t1_c1"
               data-author="alice" data-permalink="/r/rust/comments/abc/thread/c1/" data-score="10">
            <div class="entry">
              <div class="usertext-body"><div class="md"><p>Top level insight</p></div></div>
              <time datetime="2024-03-01T10:00:00+00:00">4 hours ago</time>
            </div>
            <div class="child"><div class="sitetable">
              <div class="thing comment" data-type="comment" data-fullname="t1_c2"
                   data-author="bob" data-score="5">
                <div class="entry"><div class="md"><p>First reply text</p></div></div>
                <div class="child"><div class="sitetable">
                  <div class="thing comment" data-type="comment" data-fullname="t1_c3"
                       data-author="carol">
                    <div class="entry"><div class="md"><p>Nested reply here</p></div></div>
                  </div>
                </div></div>
              </div>
            </div></div>
          </div>
        </div></body></html>"#
    }

    #[test]
    fn test_nested_thread_depths_and_parents() {
        let comments = parse_comments(nested_thread(), PAGE, HOST);

        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].comment_id, "t1_c1");
        assert_eq!(comments[0].depth, 0);
        assert_eq!(comments[0].parent_id, None);

        assert_eq!(comments[1].comment_id, "t1_c2");
        assert_eq!(comments[1].depth, 1);
        assert_eq!(comments[1].parent_id.as_deref(), Some("t1_c1"));

        assert_eq!(comments[2].comment_id, "t1_c3");
        assert_eq!(comments[2].depth, 2);
        assert_eq!(comments[2].parent_id.as_deref(), Some("t1_c2"));
    }

    #[test]
    fn test_nested_thread_fields() {
        let comments = parse_comments(nested_thread(), PAGE, HOST);

        assert_eq!(comments[0].author, "alice");
        assert_eq!(comments[0].score, 10);
        assert_eq!(comments[0].body, "Top level insight");
        assert_eq!(
            comments[0].link.as_deref(),
            Some("https://www.reddit.com/r/rust/comments/abc/thread/c1/")
        );
        assert_eq!(
            comments[0].created_time.as_deref(),
            Some("2024-03-01T10:00:00+00:00")
        );
        assert_eq!(comments[0].subreddit.as_deref(), Some("rust"));

        // Bodies stay scoped to their own comment, not merged with replies
        assert_eq!(comments[1].body, "First reply text");
        assert_eq!(comments[2].body, "Nested reply here");
    }

    #[test]
    fn test_reply_counts_bottom_up() {
        let comments = parse_comments(nested_thread(), PAGE, HOST);

        assert_eq!(comments[0].reply_count, 2);
        assert_eq!(comments[1].reply_count, 1);
        assert_eq!(comments[2].reply_count, 0);
    }

    #[test]
    fn test_empty_bodied_comment_drops_its_subtree() {
        let html = r#"<html><body><div class="sitetable nestedlisting">
          <div class="thing comment" data-type="comment" data-fullname="t1_gone">
            <div class="entry"><div class="md"></div></div>
            <div class="child"><div class="sitetable">
              <div class="thing comment" data-type="comment" data-fullname="t1_kid"
                   data-author="dave">
                <div class="entry"><div class="md"><p>Reply under a deleted node</p></div></div>
              </div>
            </div></div>
          </div>
          <div class="thing comment" data-type="comment" data-fullname="t1_ok" data-author="erin">
            <div class="entry"><div class="md"><p>Sibling survives on its own</p></div></div>
          </div>
        </div></body></html>"#;

        let comments = parse_comments(html, PAGE, HOST);

        // The skipped node and everything beneath it are gone; siblings stay
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment_id, "t1_ok");
        assert_eq!(comments[0].depth, 0);
    }

    #[test]
    fn test_body_heuristic_skips_ui_labels() {
        let html = r#"<html><body>
          <div data-type="comment" data-fullname="t1_h">
            <span>permalink</span>
            <span>reply</span>
            <span>142 points</span>
            <span>An actual comment body long enough to keep</span>
          </div>
        </body></html>"#;

        let comments = parse_comments(html, PAGE, HOST);

        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments[0].body,
            "An actual comment body long enough to keep"
        );
    }

    #[test]
    fn test_missing_id_is_synthesized() {
        let html = r#"<html><body>
          <div data-type="comment">
            <div class="md"><p>No identifier on this one</p></div>
          </div>
        </body></html>"#;

        let comments = parse_comments(html, PAGE, HOST);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment_id, "comment_0");
        assert_eq!(comments[0].author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_author_from_profile_link() {
        let html = r#"<html><body>
          <div data-type="comment" data-fullname="t1_a">
            <a class="author" href="/user/erin/">erin</a>
            <div class="md"><p>Linked author body</p></div>
          </div>
        </body></html>"#;

        let comments = parse_comments(html, PAGE, HOST);

        assert_eq!(comments[0].author, "erin");
    }

    #[test]
    fn test_no_comments_yields_empty() {
        let comments = parse_comments("<html><body><p>nothing</p></body></html>", PAGE, HOST);
        assert!(comments.is_empty());
    }

    #[test]
    fn test_subreddit_from_url() {
        assert_eq!(
            subreddit_from_url("https://old.reddit.com/r/rust/comments/x/"),
            Some("rust".to_string())
        );
        assert_eq!(subreddit_from_url("https://example.com/plain"), None);
    }
}
