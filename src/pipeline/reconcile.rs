//! Choosing between the markup and JSON renditions of a thread
//!
//! Both parsers emit the same record shape, so reconciliation reduces to
//! picking the set that recovered more of the tree. The markup rendition is
//! the primary source; the JSON payload only replaces it when it holds
//! strictly more comments, since equal counts give no reason to discard the
//! rendition that preserves the page's visible ordering.

use crate::model::Comment;

/// Picks the fuller of the two comment sets.
pub fn choose_comments(markup: Vec<Comment>, api: Vec<Comment>) -> Vec<Comment> {
    if api.len() > markup.len() {
        tracing::info!(
            "JSON payload recovered more comments ({} vs {}), using it",
            api.len(),
            markup.len()
        );
        api
    } else {
        tracing::debug!(
            "Keeping markup rendition ({} comments vs {} from JSON)",
            markup.len(),
            api.len()
        );
        markup
    }
}
