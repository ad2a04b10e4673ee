//! User preferences stored next to the notes.
//!
//! Stored under `keys::PREFS` as `{"snapMins":2,"autoLockMins":10,...}`.
//! Other keys in that record belong to other collaborators (theme, font
//! size) and are carried through untouched when we save.

use chrono::Duration;
use serde_json::{Map, Value};

use crate::errors::{NoteVaultError, Result};
use crate::history::{clamp_snap_mins, DEFAULT_SNAP_MINS};
use crate::storage::{keys, KvStore};

pub const DEFAULT_AUTO_LOCK_MINS: u32 = 10;
pub const AUTO_LOCK_MINS_RANGE: (u32, u32) = (1, 60);

const SNAP_KEY: &str = "snapMins";
const AUTO_LOCK_KEY: &str = "autoLockMins";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    /// Minutes between history snapshots, in `[1, 10]`.
    pub snap_mins: u32,
    /// Minutes of inactivity before auto-lock, in `[1, 60]`.
    pub auto_lock_mins: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            snap_mins: DEFAULT_SNAP_MINS,
            auto_lock_mins: DEFAULT_AUTO_LOCK_MINS,
        }
    }
}

pub fn clamp_auto_lock_mins(mins: u32) -> u32 {
    mins.clamp(AUTO_LOCK_MINS_RANGE.0, AUTO_LOCK_MINS_RANGE.1)
}

impl Preferences {
    /// Both values pulled into their allowed ranges.
    pub fn clamped(self) -> Self {
        Self {
            snap_mins: clamp_snap_mins(self.snap_mins),
            auto_lock_mins: clamp_auto_lock_mins(self.auto_lock_mins),
        }
    }

    pub fn auto_lock_after(&self) -> Duration {
        Duration::minutes(i64::from(clamp_auto_lock_mins(self.auto_lock_mins)))
    }

    /// Parse a stored record.  Anything unusable falls back to the
    /// default for that field; this never fails.
    pub fn from_json(raw: &str) -> Self {
        let defaults = Self::default();
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            return defaults;
        };
        Self {
            snap_mins: read_mins(&map, SNAP_KEY).unwrap_or(defaults.snap_mins),
            auto_lock_mins: read_mins(&map, AUTO_LOCK_KEY).unwrap_or(defaults.auto_lock_mins),
        }
        .clamped()
    }

    /// Load from storage; unreadable storage also yields defaults.
    pub fn load(store: &dyn KvStore) -> Self {
        match store.get(keys::PREFS) {
            Ok(Some(raw)) => Self::from_json(&raw),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read preferences, using defaults");
                Self::default()
            }
        }
    }

    /// Write our two fields into the stored record, keeping the rest.
    pub fn save(&self, store: &dyn KvStore) -> Result<()> {
        let clamped = self.clamped();
        let mut map = match store.get(keys::PREFS)? {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };
        map.insert(SNAP_KEY.into(), Value::from(clamped.snap_mins));
        map.insert(AUTO_LOCK_KEY.into(), Value::from(clamped.auto_lock_mins));

        let json = serde_json::to_string(&Value::Object(map))
            .map_err(|e| NoteVaultError::SerializationError(format!("preferences: {e}")))?;
        store.set(keys::PREFS, &json)
    }
}

/// Accept integers, floats and numeric strings; reject everything else.
fn read_mins(map: &Map<String, Value>, key: &str) -> Option<u32> {
    let value = map.get(key)?;
    let mins = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.round().max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    Some(u32::try_from(mins).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn missing_record_gives_defaults() {
        let store = MemoryStore::new();
        assert_eq!(
            Preferences::load(&store),
            Preferences {
                snap_mins: 2,
                auto_lock_mins: 10
            }
        );
    }

    #[test]
    fn values_are_clamped() {
        let prefs = Preferences::from_json(r#"{"snapMins":0,"autoLockMins":500}"#);
        assert_eq!(prefs.snap_mins, 1);
        assert_eq!(prefs.auto_lock_mins, 60);

        let prefs = Preferences::from_json(r#"{"snapMins":99,"autoLockMins":0}"#);
        assert_eq!(prefs.snap_mins, 10);
        assert_eq!(prefs.auto_lock_mins, 1);
    }

    #[test]
    fn garbage_falls_back_per_field() {
        assert_eq!(Preferences::from_json("not json"), Preferences::default());
        assert_eq!(Preferences::from_json("[1,2]"), Preferences::default());

        let prefs = Preferences::from_json(r#"{"snapMins":"5","autoLockMins":{"x":1}}"#);
        assert_eq!(prefs.snap_mins, 5);
        assert_eq!(prefs.auto_lock_mins, 10);

        let prefs = Preferences::from_json(r#"{"snapMins":-3,"autoLockMins":2.6}"#);
        assert_eq!(prefs.snap_mins, 1);
        assert_eq!(prefs.auto_lock_mins, 3);
    }

    #[test]
    fn save_keeps_foreign_fields() {
        let store = MemoryStore::new();
        store
            .set(keys::PREFS, r#"{"theme":"dark","snapMins":4}"#)
            .unwrap();

        let prefs = Preferences {
            snap_mins: 7,
            auto_lock_mins: 15,
        };
        prefs.save(&store).unwrap();

        let raw = store.get(keys::PREFS).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["snapMins"], 7);
        assert_eq!(value["autoLockMins"], 15);
        assert_eq!(Preferences::load(&store), prefs);
    }
}
