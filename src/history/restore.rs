//! Restoring a note from one of its snapshots.

use chrono::{DateTime, Utc};

use crate::errors::{NoteVaultError, Result};
use crate::store::Note;

/// Overwrite title and body with snapshot `index` and stamp `updated_at`.
///
/// History is left intact, including snapshots newer than `index`.
pub fn restore(note: &mut Note, index: usize, now: DateTime<Utc>) -> Result<()> {
    let snapshot = note
        .history
        .get(index)
        .ok_or(NoteVaultError::SnapshotOutOfRange {
            index,
            len: note.history.len(),
        })?;

    let title = snapshot.title.clone();
    let body = snapshot.body.clone();

    if !title.trim().is_empty() {
        note.title = title;
    }
    note.body = body;
    note.updated_at = now;
    Ok(())
}
