//! Line-set diff between a snapshot and the current body.
//!
//! This is a set difference over non-empty trimmed lines, not a sequence
//! alignment: moved lines are invisible and duplicate lines count once.
//! In exchange the result is cheap and fully deterministic.

use std::collections::HashSet;

use crate::store::Content;

/// Maximum number of lines reported on each side.
pub const DIFF_LINE_CAP: usize = 12;

/// Lines present on one side only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDiff {
    /// Lines in the current body that the snapshot lacks.
    pub added: Vec<String>,
    /// Lines in the snapshot that the current body lacks.
    pub removed: Vec<String>,
}

impl ContentDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare `snapshot` against `current`.
pub fn diff(snapshot: &Content, current: &Content) -> ContentDiff {
    let old_lines = snapshot.lines();
    let new_lines = current.lines();

    ContentDiff {
        added: only_in(&new_lines, &old_lines),
        removed: only_in(&old_lines, &new_lines),
    }
}

/// Lines of `side` absent from `other`, first-seen order, capped.
fn only_in(side: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    side.iter()
        .filter(|line| !other.contains(line.as_str()))
        .take(DIFF_LINE_CAP)
        .cloned()
        .collect()
}
