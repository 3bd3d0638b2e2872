//! Ordered fallback selector chains
//!
//! The source markup is unstable across layouts, so every extraction point is
//! expressed as a prioritized list of selectors tried in order from most to
//! least specific. The first selector that yields any match wins.

use scraper::{ElementRef, Selector};

/// A prioritized list of CSS selectors.
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Builds a chain from selector expressions. Expressions that fail to
    /// parse are dropped; chains are built from static strings so this only
    /// guards against typos.
    pub fn new(expressions: &[&str]) -> Self {
        let selectors = expressions
            .iter()
            .filter_map(|expr| Selector::parse(expr).ok())
            .collect();
        Self { selectors }
    }

    /// Returns all matches of the first selector that matches anything under
    /// `scope`. Later selectors are not consulted once one has matched.
    pub fn select_first<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for selector in &self.selectors {
            let matches: Vec<ElementRef<'a>> = scope.select(selector).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }

    /// Like [`select_first`](Self::select_first), but a selector only wins if
    /// at least one of its matches survives the `keep` filter. Used when a
    /// broad selector must be narrowed to direct children of the scope.
    pub fn select_first_where<'a, F>(&self, scope: ElementRef<'a>, keep: F) -> Vec<ElementRef<'a>>
    where
        F: Fn(ElementRef<'a>) -> bool,
    {
        for selector in &self.selectors {
            let matches: Vec<ElementRef<'a>> =
                scope.select(selector).filter(|m| keep(*m)).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }

    /// Returns the joined text of the first selector whose matches carry any
    /// non-whitespace text.
    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        for selector in &self.selectors {
            let text = scope
                .select(selector)
                .flat_map(|element| element.text())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                return Some(text);
            }
        }
        None
    }

    /// Text variant of [`select_first_where`](Self::select_first_where):
    /// joins the text of the surviving matches of the first selector that
    /// produces any.
    pub fn first_text_where<'a, F>(&self, scope: ElementRef<'a>, keep: F) -> Option<String>
    where
        F: Fn(ElementRef<'a>) -> bool,
    {
        for selector in &self.selectors {
            let text = scope
                .select(selector)
                .filter(|m| keep(*m))
                .flat_map(|element| element.text())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                return Some(text);
            }
        }
        None
    }

    /// Returns the first non-empty value of `attr` among matches, in chain
    /// order.
    pub fn first_attr(&self, scope: ElementRef<'_>, attr: &str) -> Option<String> {
        for selector in &self.selectors {
            for element in scope.select(selector) {
                if let Some(value) = element.value().attr(attr) {
                    let value = value.trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn chain(exprs: &[&str]) -> SelectorChain {
        SelectorChain::new(exprs)
    }

    #[test]
    fn test_first_matching_selector_wins() {
        let html = Html::parse_document(
            r#"<div><p class="b">second</p><p class="a">first</p></div>"#,
        );
        let chain = chain(&["p.a", "p.b"]);

        let matches = chain.select_first(html.root_element());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text().collect::<String>(), "first");
    }

    #[test]
    fn test_falls_through_to_later_selector() {
        let html = Html::parse_document(r#"<div><p class="b">fallback</p></div>"#);
        let chain = chain(&["p.a", "p.b"]);

        let matches = chain.select_first(html.root_element());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text().collect::<String>(), "fallback");
    }

    #[test]
    fn test_no_selector_matches() {
        let html = Html::parse_document(r#"<div><span>nothing</span></div>"#);
        let chain = chain(&["p.a", "p.b"]);

        assert!(chain.select_first(html.root_element()).is_empty());
        assert_eq!(chain.first_text(html.root_element()), None);
    }

    #[test]
    fn test_first_text_skips_empty_matches() {
        let html = Html::parse_document(
            r#"<div><p class="a">  </p><p class="b">real text</p></div>"#,
        );
        let chain = chain(&["p.a", "p.b"]);

        // p.a matches but carries no text, so the chain moves on
        assert_eq!(
            chain.first_text(html.root_element()),
            Some("real text".to_string())
        );
    }

    #[test]
    fn test_first_attr() {
        let html = Html::parse_document(
            r#"<div><time datetime="2024-01-01T00:00:00Z">then</time></div>"#,
        );
        let chain = chain(&["time[datetime]"]);

        assert_eq!(
            chain.first_attr(html.root_element(), "datetime"),
            Some("2024-01-01T00:00:00Z".to_string())
        );
    }
}
