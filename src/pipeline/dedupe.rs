//! Default filling, timestamp canonicalization, and duplicate removal
//!
//! Runs after reconciliation. Two dedup passes: an exact-record pass, then a
//! normalized-body pass that keeps the first occurrence. Both passes preserve
//! input order, and the whole routine is idempotent.

use crate::model::{Comment, DELETED_AUTHOR};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::collections::HashSet;

/// Fills defaults, canonicalizes timestamps, and removes duplicates.
pub fn process_comments(mut comments: Vec<Comment>) -> Vec<Comment> {
    let before = comments.len();

    for comment in &mut comments {
        if comment.author.is_empty() {
            comment.author = DELETED_AUTHOR.to_string();
        }
        if comment.created_utc.is_none() {
            comment.created_utc = comment
                .created_time
                .as_deref()
                .and_then(parse_timestamp);
        }
    }

    // Exact duplicates first, so the body pass sees each record once
    let mut seen_records = HashSet::new();
    comments.retain(|comment| seen_records.insert(comment.clone()));

    // Distinct records with the same normalized body collapse to the first.
    // Empty bodies are not duplicates of each other.
    let mut seen_bodies = HashSet::new();
    comments.retain(|comment| {
        comment.body.is_empty() || seen_bodies.insert(comment.body.clone())
    });

    if comments.len() < before {
        tracing::info!(
            "Removed {} duplicate comments, {} remain",
            before - comments.len(),
            comments.len()
        );
    }

    comments
}

/// Parses the loosely-formatted timestamps the sources emit into UTC.
/// Accepts integral or fractional epoch seconds, RFC 3339, and a bare
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC). Anything else is `None`.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(secs) = trimmed.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    if let Ok(secs) = trimmed.parse::<f64>() {
        return Utc.timestamp_opt(secs as i64, 0).single();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, body: &str) -> Comment {
        Comment {
            comment_id: id.to_string(),
            body: body.to_string(),
            ..Comment::default()
        }
    }

    #[test]
    fn test_exact_duplicates_removed() {
        let c = comment("c1", "same record");
        let processed = process_comments(vec![c.clone(), c.clone()]);
        assert_eq!(processed.len(), 1);
    }

    #[test]
    fn test_body_duplicates_keep_first() {
        let first = comment("c1", "identical text");
        let second = comment("c2", "identical text");
        let processed = process_comments(vec![first, second]);
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].comment_id, "c1");
    }

    #[test]
    fn test_empty_bodies_are_not_duplicates() {
        let processed = process_comments(vec![comment("c1", ""), comment("c2", "")]);
        assert_eq!(processed.len(), 2);
    }

    #[test]
    fn test_missing_author_defaults() {
        let mut c = comment("c1", "some body");
        c.author = String::new();
        let processed = process_comments(vec![c]);
        assert_eq!(processed[0].author, DELETED_AUTHOR);
    }

    #[test]
    fn test_epoch_timestamp_canonicalized() {
        let mut c = comment("c1", "some body");
        c.created_time = Some("1709287200".to_string());
        let processed = process_comments(vec![c]);
        let utc = processed[0].created_utc.unwrap();
        assert_eq!(utc.timestamp(), 1709287200);
    }

    #[test]
    fn test_rfc3339_timestamp_canonicalized() {
        let mut c = comment("c1", "some body");
        c.created_time = Some("2024-03-01T10:00:00+02:00".to_string());
        let processed = process_comments(vec![c]);
        let utc = processed[0].created_utc.unwrap();
        assert_eq!(utc.to_rfc3339(), "2024-03-01T08:00:00+00:00");
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let mut c = comment("c1", "some body");
        c.created_time = Some("4 hours ago".to_string());
        let processed = process_comments(vec![c]);
        assert!(processed[0].created_utc.is_none());
    }

    #[test]
    fn test_idempotent() {
        let comments = vec![
            comment("c1", "first body"),
            comment("c2", "second body"),
            comment("c3", "first body"),
        ];
        let once = process_comments(comments);
        let twice = process_comments(once.clone());
        assert_eq!(once, twice);
    }
}
