use serde::{Deserialize, Serialize};

/// One speakable unit of a document, such as a paragraph or heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub text: String,
    /// Lowercase structural tag (`"h1"`, `"p"`, `"li"`, ...).
    pub tag: String,
    /// Nesting depth of the element in its document.
    #[serde(default)]
    pub depth: u32,
}

impl ContentBlock {
    /// Build a block from harvested text, normalizing whitespace: line breaks
    /// are dropped, runs of whitespace collapse to one space, and the result
    /// is trimmed. The tag is lowercased.
    pub fn new(text: &str, tag: &str, depth: u32) -> Self {
        Self {
            text: normalize_whitespace(text),
            tag: tag.to_ascii_lowercase(),
            depth,
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.replace(['\n', '\r'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
