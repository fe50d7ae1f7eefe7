pub mod client;
pub mod event_details;
pub mod events;
pub mod rankings;

use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Failures from the fetch layer and the HTML extractors.
///
/// Structural absence on a page is never an error; extractors degrade to
/// placeholders instead. These variants cover the cases where nothing useful
/// could be produced at all.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("scraping is disabled by configuration")]
    Disabled,
    #[error("request to {path} failed: {message}")]
    Request { path: String, message: String },
    #[error("{path} returned status {status}")]
    Status { path: String, status: u16 },
    #[error("{path} returned a block page (matched \"{marker}\")")]
    Blocked { path: String, marker: String },
    #[error("fetching {path} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        path: String,
        attempts: u32,
        last_error: String,
    },
    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Parse a CSS selector group, flattening the borrow-carrying parse error
/// into a plain message.
pub(crate) fn sel(selectors: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selectors).map_err(|e| ScrapeError::Selector(e.to_string()))
}

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn squash_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-squashed text content of an element.
pub(crate) fn element_text(el: &ElementRef) -> String {
    squash_ws(&el.text().collect::<String>())
}

/// Text of the first descendant matching any of the selectors, or empty.
pub(crate) fn first_text(el: &ElementRef, selectors: &str) -> String {
    Selector::parse(selectors)
        .ok()
        .and_then(|selector| el.select(&selector).next().map(|found| element_text(&found)))
        .unwrap_or_default()
}

/// Attribute value of the first descendant matching the selectors.
pub(crate) fn first_attr(el: &ElementRef, selectors: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selectors).ok()?;
    el.select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(str::to_string)
}

pub(crate) fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_squash_ws() {
        assert_eq!(squash_ws("  a \n b\t c  "), "a b c");
        assert_eq!(squash_ws(""), "");
        assert_eq!(squash_ws("   "), "");
    }

    #[test]
    fn test_first_text_and_attr() {
        let html = Html::parse_fragment(
            r#"<div><span class="a" data-x="1"> one </span><span class="a">two</span></div>"#,
        );
        let root = html.root_element();
        assert_eq!(first_text(&root, ".a"), "one");
        assert_eq!(first_text(&root, ".missing"), "");
        assert_eq!(first_attr(&root, ".a", "data-x").as_deref(), Some("1"));
        assert_eq!(first_attr(&root, ".a", "data-y"), None);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        assert!(sel("li:::nope").is_err());
    }
}
