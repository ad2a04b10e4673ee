//! Version history: snapshot policy, line diff, restore.

pub mod diff;
pub mod policy;
pub mod restore;

pub use diff::{diff, ContentDiff, DIFF_LINE_CAP};
pub use policy::{clamp_snap_mins, is_snapshot_due, snapshot_if_due, DEFAULT_SNAP_MINS};
pub use restore::restore;
