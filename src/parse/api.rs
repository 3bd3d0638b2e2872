//! Comment tree extraction from the structured JSON payload
//!
//! The JSON rendition of a thread is an array whose second element holds the
//! comment listing; each comment node nests its replies under
//! `data.replies.data.children`. An exhausted reply branch appears as an
//! empty string instead of an object. Placeholder nodes (`kind == "more"`)
//! and deleted content are dropped.

use crate::model::{Comment, UNKNOWN_AUTHOR};
use crate::parse::comments::attach_reply_counts;
use crate::text;
use serde_json::Value;

/// Body text shorter than this is treated as noise and dropped
const MIN_BODY_LEN: usize = 3;

/// Parses the comment tree out of the thread's JSON payload.
///
/// Output ordering, depth annotation, and reply counting match
/// [`parse_comments`](crate::parse::parse_comments), so the two renditions
/// are directly comparable downstream.
pub fn parse_json_comments(payload: &Value, canonical_host: &str) -> Vec<Comment> {
    let mut comments = Vec::new();

    let children = payload
        .get(1)
        .and_then(|listing| listing.get("data"))
        .and_then(|data| data.get("children"))
        .and_then(Value::as_array);

    let Some(children) = children else {
        tracing::warn!("JSON payload has no comment listing");
        return comments;
    };

    for child in children {
        walk(child, None, 0, canonical_host, &mut comments);
    }

    attach_reply_counts(&mut comments);

    tracing::info!("Extracted {} comments from JSON payload", comments.len());
    comments
}

/// Emits one node and recurses into its replies. A skipped node (deleted
/// content or a noise body) takes its whole reply subtree with it, mirroring
/// the markup walk.
fn walk(
    node: &Value,
    parent_id: Option<&str>,
    depth: u32,
    canonical_host: &str,
    comments: &mut Vec<Comment>,
) {
    let kind = node.get("kind").and_then(Value::as_str).unwrap_or("");
    if kind != "t1" {
        // "more" placeholders and unknown kinds carry no comment data
        return;
    }

    let Some(data) = node.get("data") else {
        return;
    };

    let author = data
        .get("author")
        .and_then(Value::as_str)
        .filter(|a| !a.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR);
    let body_raw = data.get("body").and_then(Value::as_str).unwrap_or("");

    let deleted = matches!(author, "[deleted]" | "[removed]")
        || matches!(body_raw, "[deleted]" | "[removed]");
    let body = text::normalize(body_raw);
    if deleted || body.len() < MIN_BODY_LEN {
        return;
    }

    let comment_id = data
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("comment_{}", comments.len()));

    let link = data
        .get("permalink")
        .and_then(Value::as_str)
        .map(|permalink| format!("{}{}", canonical_host, permalink));

    let created_time = data
        .get("created_utc")
        .and_then(Value::as_f64)
        .map(|secs| format!("{}", secs as i64));

    comments.push(Comment {
        comment_id: comment_id.clone(),
        parent_id: parent_id.map(str::to_string),
        author: author.to_string(),
        author_id: data
            .get("author_fullname")
            .and_then(Value::as_str)
            .map(str::to_string),
        subreddit: data
            .get("subreddit")
            .and_then(Value::as_str)
            .map(str::to_string),
        link,
        created_time,
        created_utc: None,
        body_raw: body_raw.to_string(),
        body,
        body_processed: None,
        score: data.get("score").and_then(Value::as_i64).unwrap_or(0),
        depth,
        reply_count: 0,
        ..Comment::default()
    });

    let replies = data
        .get("replies")
        .filter(|r| r.is_object())
        .and_then(|r| r.get("data"))
        .and_then(|d| d.get("children"))
        .and_then(Value::as_array);

    if let Some(replies) = replies {
        for reply in replies {
            walk(reply, Some(&comment_id), depth + 1, canonical_host, comments);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HOST: &str = "https://www.reddit.com";

    fn thread_payload() -> Value {
        json!([
            {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {}}]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {
                    "id": "c1",
                    "author": "alice",
                    "author_fullname": "t2_a1",
                    "subreddit": "rust",
                    "permalink": "/r/rust/comments/abc/thread/c1/",
                    "created_utc": 1709287200.0,
                    "score": 10,
                    "body": "Top level insight",
                    "replies": {"kind": "Listing", "data": {"children": [
                        {"kind": "t1", "data": {
                            "id": "c2",
                            "author": "bob",
                            "score": 5,
                            "body": "First reply text",
                            "replies": {"kind": "Listing", "data": {"children": [
                                {"kind": "t1", "data": {
                                    "id": "c3",
                                    "author": "carol",
                                    "body": "Nested reply here",
                                    "replies": ""
                                }}
                            ]}}
                        }}
                    ]}}
                }},
                {"kind": "more", "data": {"count": 57, "children": ["d4", "d5"]}}
            ]}}
        ])
    }

    #[test]
    fn test_depths_and_parents() {
        let comments = parse_json_comments(&thread_payload(), HOST);

        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].comment_id, "c1");
        assert_eq!(comments[0].depth, 0);
        assert_eq!(comments[0].parent_id, None);
        assert_eq!(comments[1].depth, 1);
        assert_eq!(comments[1].parent_id.as_deref(), Some("c1"));
        assert_eq!(comments[2].depth, 2);
        assert_eq!(comments[2].parent_id.as_deref(), Some("c2"));
    }

    #[test]
    fn test_reply_counts_count_descendants() {
        let comments = parse_json_comments(&thread_payload(), HOST);

        assert_eq!(comments[0].reply_count, 2);
        assert_eq!(comments[1].reply_count, 1);
        assert_eq!(comments[2].reply_count, 0);
    }

    #[test]
    fn test_fields() {
        let comments = parse_json_comments(&thread_payload(), HOST);

        assert_eq!(comments[0].author, "alice");
        assert_eq!(comments[0].author_id.as_deref(), Some("t2_a1"));
        assert_eq!(comments[0].subreddit.as_deref(), Some("rust"));
        assert_eq!(comments[0].score, 10);
        assert_eq!(comments[0].created_time.as_deref(), Some("1709287200"));
        assert_eq!(
            comments[0].link.as_deref(),
            Some("https://www.reddit.com/r/rust/comments/abc/thread/c1/")
        );
    }

    #[test]
    fn test_more_placeholders_skipped() {
        let comments = parse_json_comments(&thread_payload(), HOST);
        assert!(comments.iter().all(|c| c.comment_id != "d4"));
    }

    #[test]
    fn test_deleted_comment_drops_its_subtree() {
        let payload = json!([
            {},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {
                    "id": "gone",
                    "author": "[deleted]",
                    "body": "[removed]",
                    "replies": {"kind": "Listing", "data": {"children": [
                        {"kind": "t1", "data": {
                            "id": "kid",
                            "author": "dave",
                            "body": "Reply under a deleted node",
                            "replies": ""
                        }}
                    ]}}
                }},
                {"kind": "t1", "data": {
                    "id": "ok",
                    "author": "erin",
                    "body": "Sibling survives on its own",
                    "replies": ""
                }}
            ]}}
        ]);

        let comments = parse_json_comments(&payload, HOST);

        // The deleted node and everything beneath it are gone; siblings stay
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment_id, "ok");
        assert_eq!(comments[0].depth, 0);
    }

    #[test]
    fn test_tiny_body_skipped() {
        let payload = json!([
            {},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"id": "x", "author": "eve", "body": "ok", "replies": ""}}
            ]}}
        ]);

        assert!(parse_json_comments(&payload, HOST).is_empty());
    }

    #[test]
    fn test_empty_string_replies_is_leaf() {
        let payload = json!([
            {},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"id": "leaf", "author": "al", "body": "A leaf node body", "replies": ""}}
            ]}}
        ]);

        let comments = parse_json_comments(&payload, HOST);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].reply_count, 0);
    }

    #[test]
    fn test_empty_payload() {
        assert!(parse_json_comments(&json!([]), HOST).is_empty());
        assert!(parse_json_comments(&json!({}), HOST).is_empty());
    }
}
