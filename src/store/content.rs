//! Note body content and its plain-text projections.
//!
//! The body is an opaque markup string.  Nothing in the core renders it;
//! snapshots and diffs only need a pure, environment-independent
//! plain-text view, which lives here.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Serializable note body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(String);

fn line_break_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|blockquote|pre|tr|ul|ol)\s*>")
            .expect("static regex")
    })
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

impl Content {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// The raw markup.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.plain_text().is_empty()
    }

    /// Markup stripped, entities decoded, line structure kept.
    ///
    /// Block-level closing tags and `<br>` become line breaks so that
    /// paragraph-per-line content diffs line by line.
    pub fn plain_text(&self) -> String {
        let broken = line_break_pattern().replace_all(&self.0, "\n");
        let stripped = tag_pattern().replace_all(&broken, "");
        decode_entities(&stripped).trim().to_string()
    }

    /// Plain text with every whitespace run collapsed to one space.
    ///
    /// This is the comparison key for the snapshot policy.
    pub fn normalized_text(&self) -> String {
        self.plain_text()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Non-empty trimmed plain-text lines.
    pub fn lines(&self) -> Vec<String> {
        self.plain_text()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Decode the handful of entities an editor actually emits.
/// `&amp;` goes last so `&amp;lt;` stays `&lt;`.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
