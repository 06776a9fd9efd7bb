//! Parsed HTML page and text helpers shared by the extractors.

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionError;

/// Words kept on each side of a match when building its context.
pub const CONTEXT_WORDS: usize = 10;

/// Characters of parent text used when a match cannot be located.
const CONTEXT_FALLBACK_CHARS: usize = 200;

/// A parsed HTML page.
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    /// Parse a full HTML document. Parsing is lenient and never fails.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Elements matching a CSS selector, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, ExtractionError> {
        let parsed = Selector::parse(selector).map_err(|e| ExtractionError::Selector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.html.select(&parsed).collect())
    }

    /// Text of the whole page with one line per text node.
    pub fn page_text(&self) -> String {
        line_text(&self.html.root_element())
    }

    /// Whether the page has no visible text at all.
    pub fn is_blank(&self) -> bool {
        self.html
            .root_element()
            .text()
            .all(|t| t.trim().is_empty())
    }
}

/// Concatenated text of an element, as rendered without separators.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text nodes trimmed and joined with newlines, skipping empty ones.
pub fn line_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text nodes trimmed and joined with single spaces.
pub fn stripped_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the element is an `<a href="tel:...">` link.
pub fn is_telephone_link(element: &ElementRef<'_>) -> bool {
    element.value().name() == "a"
        && element
            .value()
            .attr("href")
            .is_some_and(|href| href.trim().to_lowercase().starts_with("tel:"))
}

/// Heading level for `h1`..`h6`, if the element is a heading.
pub fn heading_level(element: &ElementRef<'_>) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Words around `target` inside the text of the element's parent.
///
/// The target is located by the first parent word containing its first word;
/// when the target does not occur in the parent text at all, the first 200
/// characters of that text are returned instead.
pub fn surrounding_context(element: &ElementRef<'_>, target: &str) -> String {
    let full_text = element
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| element_text(&parent))
        .unwrap_or_else(|| element_text(element));

    let target_lower = target.to_lowercase();
    let target_words: Vec<&str> = target.split_whitespace().collect();
    let Some(first_word) = target_words.first() else {
        return full_text.chars().take(CONTEXT_FALLBACK_CHARS).collect();
    };
    if !full_text.to_lowercase().contains(&target_lower) {
        return full_text.chars().take(CONTEXT_FALLBACK_CHARS).collect();
    }

    let words: Vec<&str> = full_text.split_whitespace().collect();
    let first_lower = first_word.to_lowercase();
    let word_index = words
        .iter()
        .position(|w| w.to_lowercase().contains(&first_lower))
        .unwrap_or(0);

    let start = word_index.saturating_sub(CONTEXT_WORDS);
    let end = (word_index + target_words.len() + CONTEXT_WORDS).min(words.len());
    words[start..end].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_text_keeps_breaks() {
        let doc = PageDocument::parse(
            "<div class='address'>Health Dept<br>880 Northcrest Dr<br> Crescent City, CA 95531</div>",
        );
        let elements = doc.select(".address").unwrap();

        assert_eq!(
            line_text(&elements[0]),
            "Health Dept\n880 Northcrest Dr\nCrescent City, CA 95531"
        );
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = PageDocument::parse("<p>x</p>");
        assert!(matches!(
            doc.select("[[broken"),
            Err(ExtractionError::Selector { .. })
        ));
    }

    #[test]
    fn test_surrounding_context_window() {
        let doc = PageDocument::parse(
            "<div><p>one two three four five six seven eight nine ten eleven twelve \
             <span>call 555-123-4567</span> after words here</p></div>",
        );
        let span = doc.select("span").unwrap();
        let context = surrounding_context(&span[0], "555-123-4567");

        assert!(context.starts_with("four"));
        assert!(context.ends_with("after words here"));
    }

    #[test]
    fn test_surrounding_context_fallback() {
        let doc = PageDocument::parse("<div><span>Hours vary</span></div>");
        let span = doc.select("span").unwrap();
        assert_eq!(surrounding_context(&span[0], "555-000-1111"), "Hours vary");
    }

    #[test]
    fn test_telephone_link() {
        let doc = PageDocument::parse("<a href=' TEL:+17074650426'>Call</a><a href='/x'>x</a>");
        let links = doc.select("a").unwrap();
        assert!(is_telephone_link(&links[0]));
        assert!(!is_telephone_link(&links[1]));
    }

    #[test]
    fn test_blank_page() {
        assert!(PageDocument::parse("<html><body>  </body></html>").is_blank());
        assert!(!PageDocument::parse("<p>hi</p>").is_blank());
    }
}
