//! Visible text extraction
//!
//! Turns a fetched HTML page into the text a reader would see, which is
//! what the licensing marker is searched in.

use scraper::{Html, Node};

/// Elements whose text never renders
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Content extraction functionality
pub struct ContentExtractor;

impl ContentExtractor {
    /// Concatenate every rendered text node of the document, in document order
    pub fn visible_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let mut text = String::new();

        for node in document.root_element().descendants() {
            let Node::Text(chunk) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            if !hidden {
                text.push_str(chunk);
            }
        }

        text
    }

    /// Whether the page's visible text contains `marker`, ignoring case
    pub fn contains_marker(html: &str, marker: &str) -> bool {
        Self::visible_text(html)
            .to_lowercase()
            .contains(&marker.to_lowercase())
    }
}
