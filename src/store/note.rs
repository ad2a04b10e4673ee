//! Note and Snapshot types.
//!
//! Field names serialize in camelCase (`createdAt`, `updatedAt`) and the
//! body also accepts the legacy `html` key, so state written by earlier
//! builds of the app still loads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::Content;

/// Unique note identifier.
pub type NoteId = String;

/// Maximum number of snapshots kept per note.
pub const MAX_HISTORY: usize = 40;

/// Title used when a note has none.
pub const UNTITLED: &str = "Untitled note";

/// An immutable capture of a note's title and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(alias = "ts")]
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "html")]
    pub body: Content,
}

/// A single note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Empty ids are reassigned during normalization.
    #[serde(default)]
    pub id: NoteId,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default, alias = "html")]
    pub body: Content,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub pinned: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Snapshots, oldest first.
    #[serde(default)]
    pub history: Vec<Snapshot>,
}

fn default_title() -> String {
    UNTITLED.to_string()
}

/// Initial values for a new note.
#[derive(Debug, Clone, Default)]
pub struct NoteInit {
    pub title: Option<String>,
    pub body: Content,
    pub tags: Vec<String>,
    pub pinned: bool,
}

impl NoteInit {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Content>) -> Self {
        self.body = body.into();
        self
    }
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<Content>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

impl NotePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn body(body: impl Into<Content>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.tags.is_none() && self.pinned.is_none()
    }
}

/// Generate a fresh random note id (32 lowercase hex digits).
pub fn new_note_id() -> NoteId {
    format!("{:032x}", rand::random::<u128>())
}

/// Trim a title, falling back to the untitled placeholder.
pub(crate) fn clean_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trim tags and drop empty or case-insensitive duplicates, keeping order.
pub(crate) fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if tag.is_empty() || out.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            continue;
        }
        out.push(tag);
    }
    out
}

impl Note {
    pub(crate) fn from_init(init: NoteInit, now: DateTime<Utc>) -> Self {
        Self {
            id: new_note_id(),
            title: clean_title(init.title.as_deref().unwrap_or(UNTITLED)),
            body: init.body,
            tags: clean_tags(init.tags),
            pinned: init.pinned,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
        }
    }

    /// The most recent snapshot, if any.
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.history.last()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag.trim()))
    }

    pub(crate) fn apply(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = clean_title(&title);
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(tags) = patch.tags {
            self.tags = clean_tags(tags);
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
        self.updated_at = now;
    }
}
