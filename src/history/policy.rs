//! When to capture a snapshot.
//!
//! A note gets a new snapshot only when enough time has passed since the
//! last one *and* its normalized text actually changed.  Continuous
//! typing therefore yields one snapshot per interval at most.

use chrono::{DateTime, Duration, Utc};

use crate::store::{Note, Snapshot, MAX_HISTORY};

/// Default minutes between snapshots.
pub const DEFAULT_SNAP_MINS: u32 = 2;

/// Allowed range for the snapshot interval, in minutes.
pub const SNAP_MINS_RANGE: (u32, u32) = (1, 10);

/// Clamp a configured interval into `SNAP_MINS_RANGE`.
pub fn clamp_snap_mins(mins: u32) -> u32 {
    mins.clamp(SNAP_MINS_RANGE.0, SNAP_MINS_RANGE.1)
}

/// Whether a snapshot is due for `note` at `now`.
pub fn is_snapshot_due(note: &Note, now: DateTime<Utc>, snap_mins: u32) -> bool {
    let interval = Duration::minutes(i64::from(clamp_snap_mins(snap_mins)));

    let (elapsed_ok, last_text) = match note.last_snapshot() {
        Some(last) => (now - last.timestamp >= interval, last.body.normalized_text()),
        None => (true, String::new()),
    };

    elapsed_ok && note.body.normalized_text() != last_text
}

/// Append a snapshot if one is due; returns whether one was taken.
///
/// History is a FIFO ring: at `MAX_HISTORY` the oldest entry goes.
pub fn snapshot_if_due(note: &mut Note, now: DateTime<Utc>, snap_mins: u32) -> bool {
    if !is_snapshot_due(note, now, snap_mins) {
        return false;
    }

    // Keep timestamps non-decreasing even if the clock stepped back.
    let timestamp = note
        .last_snapshot()
        .map_or(now, |last| last.timestamp.max(now));

    note.history.push(Snapshot {
        timestamp,
        title: note.title.clone(),
        body: note.body.clone(),
    });
    if note.history.len() > MAX_HISTORY {
        let excess = note.history.len() - MAX_HISTORY;
        note.history.drain(..excess);
    }
    true
}
