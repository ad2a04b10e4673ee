//! Document store: notes, view state, and the activity timeline.
//!
//! This module provides:
//! - `Content` and its plain-text projections (`content`)
//! - `Note`, `Snapshot`, `NoteInit`, `NotePatch` (`note`)
//! - `AppState`, panes, filters, activity, repair (`state`)

pub mod content;
pub mod note;
pub mod state;

// Re-export the most commonly used items.
pub use content::Content;
pub use note::{Note, NoteId, NoteInit, NotePatch, Snapshot, MAX_HISTORY};
pub use state::{ActivityEvent, ActivityKind, AppState, Filter, Pane, Panes, ACTIVITY_CAP};
