//! Text normalization
//!
//! One normalization rule is applied to every body and title regardless of
//! which parser produced it: NFKD decomposition with combining marks
//! stripped, then punctuation collapsed to whitespace.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalizes text by removing accents and collapsing punctuation.
///
/// # Example
///
/// ```
/// use threadsift::text::normalize;
///
/// assert_eq!(normalize("café, s'il te plaît!"), "cafe s il te plait");
/// ```
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes optional text, mapping absent or effectively-empty input to
/// None.
pub fn normalize_opt(text: Option<&str>) -> Option<String> {
    let normalized = normalize(text?);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
