//! `AppState`: the in-memory document store.
//!
//! All mutation is synchronous and infallible: operations on an unknown
//! note id are tolerated no-ops that return `false` / `None`, so stale
//! references from collaborators never crash anything.  Nothing here
//! performs I/O; callers schedule persistence after mutating.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::content::Content;
use super::note::{clean_tags, new_note_id, Note, NoteId, NoteInit, NotePatch, MAX_HISTORY};

/// Maximum number of activity events kept (newest first).
pub const ACTIVITY_CAP: usize = 200;

/// Maximum number of open tabs per pane.
pub const TAB_CAP: usize = 10;

/// How far back the `Recent` filter reaches.
const RECENT_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Panes
// ---------------------------------------------------------------------------

/// One of the two editor panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Left,
    Right,
}

impl Pane {
    pub const ALL: [Pane; 2] = [Pane::Left, Pane::Right];
}

/// A value per pane, serialized as `{"L": .., "R": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panes<T> {
    #[serde(rename = "L", default)]
    pub left: T,
    #[serde(rename = "R", default)]
    pub right: T,
}

impl<T> Panes<T> {
    pub fn get(&self, pane: Pane) -> &T {
        match pane {
            Pane::Left => &self.left,
            Pane::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, pane: Pane) -> &mut T {
        match pane {
            Pane::Left => &mut self.left,
            Pane::Right => &mut self.right,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter and activity
// ---------------------------------------------------------------------------

/// Note list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Pinned,
    Recent,
    /// Also what unknown filter names load as.
    #[default]
    #[serde(other)]
    All,
}

/// What an activity event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    Create,
    Edit,
    Duplicate,
    Delete,
    Pin,
    Unpin,
    TagAdded,
    TagRemoved,
    Snapshot,
    Restore,
    Import,
    VaultEnabled,
    #[serde(other)]
    Other,
}

/// One entry of the activity timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    #[serde(default)]
    pub id: String,

    #[serde(alias = "ts", default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "type")]
    pub kind: ActivityKind,

    #[serde(default)]
    pub note_id: Option<NoteId>,

    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The whole document store plus view/selection state.
///
/// Every field has a serde default, so partially valid saved state
/// still loads; `normalize` then repairs cross-references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub notes: Vec<Note>,

    #[serde(default, rename = "activeTabs")]
    pub tabs: Panes<Vec<NoteId>>,

    #[serde(default, rename = "activeId")]
    pub active: Panes<Option<NoteId>>,

    #[serde(default)]
    pub split: bool,

    #[serde(default)]
    pub filter: Filter,

    #[serde(default)]
    pub query: String,

    #[serde(default = "default_view")]
    pub view: String,

    /// Newest first, capped at `ACTIVITY_CAP`.
    #[serde(default)]
    pub activity: Vec<ActivityEvent>,
}

fn default_view() -> String {
    "notes".to_string()
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            tabs: Panes::default(),
            active: Panes::default(),
            split: false,
            filter: Filter::All,
            query: String::new(),
            view: default_view(),
            activity: Vec::new(),
        }
    }
}

impl AppState {
    /// A fresh store with one pinned welcome note open in the left pane.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut state = Self::default();
        let welcome = NoteInit {
            title: Some("Welcome to NoteVault".into()),
            body: Content::new(
                "<h2>Local-first notes</h2>\
                 <p>Everything is saved on this device automatically.</p>\
                 <p>Enable the vault to encrypt your notes with a password.</p>",
            ),
            tags: vec!["notevault".into()],
            pinned: true,
        };
        let id = state.create_note(welcome, now).id.clone();
        state.activity.clear();
        state.open_in_pane(Pane::Left, &id);
        state
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn note_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.note(id).is_some()
    }

    /// The note currently shown in `pane`, if any.
    pub fn active_note(&self, pane: Pane) -> Option<&Note> {
        self.active.get(pane).as_deref().and_then(|id| self.note(id))
    }

    /// Pinned notes first, then most recently updated.
    pub fn sorted_notes(&self) -> Vec<&Note> {
        let mut list: Vec<&Note> = self.notes.iter().collect();
        list.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        list
    }

    /// Notes matching the current filter and query, sorted.
    ///
    /// The query is a case-insensitive substring match over title, plain
    /// text and tags; ranking belongs to the search collaborator.
    pub fn visible_notes(&self, now: DateTime<Utc>) -> Vec<&Note> {
        let query = self.query.trim().to_lowercase();
        let cutoff = now - Duration::days(RECENT_DAYS);

        self.sorted_notes()
            .into_iter()
            .filter(|n| match self.filter {
                Filter::All => true,
                Filter::Pinned => n.pinned,
                Filter::Recent => n.updated_at >= cutoff,
            })
            .filter(|n| {
                if query.is_empty() {
                    return true;
                }
                let haystack = format!("{} {} {}", n.title, n.body.plain_text(), n.tags.join(" "))
                    .to_lowercase();
                haystack.contains(&query)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Note mutation
    // ------------------------------------------------------------------

    /// Create a note at the front of the list.
    pub fn create_note(&mut self, init: NoteInit, now: DateTime<Utc>) -> &Note {
        let note = Note::from_init(init, now);
        let id = note.id.clone();
        self.notes.insert(0, note);
        self.log_event(ActivityKind::Create, Some(&id), BTreeMap::new(), now);
        &self.notes[0]
    }

    /// Merge `patch` into a note and bump `updated_at`.
    pub fn update_note(&mut self, id: &str, patch: NotePatch, now: DateTime<Utc>) -> bool {
        let Some(note) = self.note_mut(id) else {
            return false;
        };
        note.apply(patch, now);
        self.log_event(ActivityKind::Edit, Some(id), BTreeMap::new(), now);
        true
    }

    /// Remove a note and every reference to it.
    ///
    /// Each pane whose active id was the deleted note falls back to the
    /// first remaining tab in that pane, or `None`.
    pub fn delete_note(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            return false;
        }

        for pane in Pane::ALL {
            let tabs = self.tabs.get_mut(pane);
            tabs.retain(|t| t != id);
            let next = tabs.first().cloned();
            let active = self.active.get_mut(pane);
            if active.as_deref() == Some(id) {
                *active = next;
            }
        }

        self.log_event(ActivityKind::Delete, Some(id), BTreeMap::new(), now);
        true
    }

    /// Copy a note under a fresh id with an empty history.
    pub fn duplicate_note(&mut self, id: &str, now: DateTime<Utc>) -> Option<NoteId> {
        let source = self.note(id)?;
        let copy = Note {
            id: new_note_id(),
            title: format!("{} (copy)", source.title),
            body: source.body.clone(),
            tags: source.tags.clone(),
            pinned: false,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
        };
        let new_id = copy.id.clone();
        self.notes.insert(0, copy);

        let mut meta = BTreeMap::new();
        meta.insert("from".to_string(), serde_json::Value::from(id));
        self.log_event(ActivityKind::Duplicate, Some(&new_id), meta, now);
        Some(new_id)
    }

    /// Flip the pinned flag; returns the new value.
    pub fn toggle_pin(&mut self, id: &str, now: DateTime<Utc>) -> Option<bool> {
        let note = self.note_mut(id)?;
        note.pinned = !note.pinned;
        note.updated_at = now;
        let pinned = note.pinned;
        let kind = if pinned {
            ActivityKind::Pin
        } else {
            ActivityKind::Unpin
        };
        self.log_event(kind, Some(id), BTreeMap::new(), now);
        Some(pinned)
    }

    /// Add a tag; returns `false` for unknown notes, blank tags, or
    /// tags already present (case-insensitive).
    pub fn add_tag(&mut self, id: &str, tag: &str, now: DateTime<Utc>) -> bool {
        let tag = tag.trim();
        let Some(note) = self.note_mut(id) else {
            return false;
        };
        if tag.is_empty() || note.has_tag(tag) {
            return false;
        }
        note.tags.push(tag.to_string());
        note.updated_at = now;
        self.log_event(ActivityKind::TagAdded, Some(id), tag_meta(tag), now);
        true
    }

    pub fn remove_tag(&mut self, id: &str, tag: &str, now: DateTime<Utc>) -> bool {
        let tag = tag.trim();
        let Some(note) = self.note_mut(id) else {
            return false;
        };
        let before = note.tags.len();
        note.tags.retain(|t| !t.eq_ignore_ascii_case(tag));
        if note.tags.len() == before {
            return false;
        }
        note.updated_at = now;
        self.log_event(ActivityKind::TagRemoved, Some(id), tag_meta(tag), now);
        true
    }

    /// Merge notes from another state by id; incoming notes win.
    ///
    /// Activity from the incoming state is prepended and re-capped.
    /// Returns the number of incoming notes.
    pub fn import_state(&mut self, incoming: AppState, now: DateTime<Utc>) -> usize {
        let mut incoming = incoming;
        incoming.normalize();
        let count = incoming.notes.len();
        if count == 0 {
            return 0;
        }

        for note in incoming.notes {
            match self.notes.iter_mut().find(|n| n.id == note.id) {
                Some(existing) => *existing = note,
                None => self.notes.push(note),
            }
        }

        let mut activity = incoming.activity;
        activity.append(&mut self.activity);
        activity.truncate(ACTIVITY_CAP);
        self.activity = activity;

        let left_ok = self
            .active
            .left
            .as_deref()
            .is_some_and(|id| self.contains(id));
        if !left_ok {
            if let Some(first) = self.sorted_notes().first().map(|n| n.id.clone()) {
                self.tabs.left = vec![first.clone()];
                self.active.left = Some(first);
            }
        }

        let mut meta = BTreeMap::new();
        meta.insert("count".to_string(), serde_json::Value::from(count));
        self.log_event(ActivityKind::Import, None, meta, now);
        count
    }

    // ------------------------------------------------------------------
    // Tabs and panes
    // ------------------------------------------------------------------

    /// Show a note in a pane, opening a tab for it if needed.
    pub fn open_in_pane(&mut self, pane: Pane, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        let tabs = self.tabs.get_mut(pane);
        if !tabs.iter().any(|t| t == id) {
            tabs.insert(0, id.to_string());
        }
        tabs.truncate(TAB_CAP);
        *self.active.get_mut(pane) = Some(id.to_string());
        true
    }

    pub fn close_tab(&mut self, pane: Pane, id: &str) -> bool {
        let tabs = self.tabs.get_mut(pane);
        let before = tabs.len();
        tabs.retain(|t| t != id);
        if tabs.len() == before {
            return false;
        }
        let next = tabs.first().cloned();
        let active = self.active.get_mut(pane);
        if active.as_deref() == Some(id) {
            *active = next;
        }
        true
    }

    /// Toggle split view; returns the new value.
    ///
    /// Turning split on with an empty right pane shows the first note
    /// that is not already active on the left.
    pub fn toggle_split(&mut self) -> bool {
        self.split = !self.split;
        if self.split && self.active.right.is_none() {
            let left = self.active.left.clone();
            let alt = self
                .notes
                .iter()
                .find(|n| Some(&n.id) != left.as_ref())
                .map(|n| n.id.clone());
            if let Some(alt) = alt {
                self.tabs.right = vec![alt.clone()];
                self.active.right = Some(alt);
            }
        }
        self.split
    }

    /// Ids of the notes currently shown in either pane, deduplicated.
    pub fn active_note_ids(&self) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = Vec::with_capacity(2);
        for pane in Pane::ALL {
            if let Some(id) = self.active.get(pane) {
                if self.contains(id) && !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }

    // ------------------------------------------------------------------
    // Activity
    // ------------------------------------------------------------------

    /// Prepend an event and trim the log to `ACTIVITY_CAP`.
    pub fn log_event(
        &mut self,
        kind: ActivityKind,
        note_id: Option<&str>,
        meta: BTreeMap<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) {
        self.activity.insert(
            0,
            ActivityEvent {
                id: new_note_id(),
                timestamp: now,
                kind,
                note_id: note_id.map(str::to_string),
                meta,
            },
        );
        self.activity.truncate(ACTIVITY_CAP);
    }

    // ------------------------------------------------------------------
    // Repair
    // ------------------------------------------------------------------

    /// Repair cross-references in freshly loaded state.
    ///
    /// Assigns ids to notes without one, drops duplicate ids (first
    /// wins), cleans tags, caps history and activity, prunes tab lists
    /// and clears dangling active ids.  Returns the number of repairs.
    pub fn normalize(&mut self) -> usize {
        let mut repairs = 0;

        let mut seen = HashSet::new();
        let mut notes = Vec::with_capacity(self.notes.len());
        for mut note in std::mem::take(&mut self.notes) {
            if note.id.is_empty() {
                note.id = new_note_id();
                repairs += 1;
            }
            if !seen.insert(note.id.clone()) {
                repairs += 1;
                continue;
            }
            let cleaned = clean_tags(note.tags.clone());
            if cleaned != note.tags {
                note.tags = cleaned;
                repairs += 1;
            }
            if note.history.len() > MAX_HISTORY {
                let excess = note.history.len() - MAX_HISTORY;
                note.history.drain(..excess);
                repairs += 1;
            }
            notes.push(note);
        }
        self.notes = notes;

        for pane in Pane::ALL {
            let mut tabs = std::mem::take(self.tabs.get_mut(pane));
            let before = tabs.len();
            let mut seen_tabs = HashSet::new();
            tabs.retain(|id| self.contains(id) && seen_tabs.insert(id.clone()));
            tabs.truncate(TAB_CAP);
            if tabs.len() != before {
                repairs += 1;
            }

            let active = self.active.get(pane).clone();
            if let Some(id) = active {
                if !self.contains(&id) {
                    *self.active.get_mut(pane) = tabs.first().cloned();
                    repairs += 1;
                }
            }
            *self.tabs.get_mut(pane) = tabs;
        }

        if self.activity.len() > ACTIVITY_CAP {
            self.activity.truncate(ACTIVITY_CAP);
            repairs += 1;
        }

        repairs
    }
}

fn tag_meta(tag: &str) -> BTreeMap<String, serde_json::Value> {
    let mut meta = BTreeMap::new();
    meta.insert("tag".to_string(), serde_json::Value::from(tag));
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn with_notes(titles: &[&str]) -> (AppState, Vec<NoteId>) {
        let mut state = AppState::default();
        let ids = titles
            .iter()
            .map(|t| state.create_note(NoteInit::titled(*t), now()).id.clone())
            .collect();
        (state, ids)
    }

    #[test]
    fn create_puts_note_first_and_logs() {
        let (state, ids) = with_notes(&["a", "b"]);
        assert_eq!(state.notes[0].id, ids[1]);
        assert_eq!(state.activity.len(), 2);
        assert_eq!(state.activity[0].kind, ActivityKind::Create);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let (mut state, _) = with_notes(&["a"]);
        assert!(!state.update_note("nope", NotePatch::title("x"), now()));
        assert!(!state.delete_note("nope", now()));
        assert!(state.toggle_pin("nope", now()).is_none());
        assert!(state.duplicate_note("nope", now()).is_none());
        assert!(!state.open_in_pane(Pane::Left, "nope"));
        assert_eq!(state.notes.len(), 1);
    }

    #[test]
    fn open_in_pane_caps_tabs() {
        let titles: Vec<String> = (0..12).map(|i| format!("n{i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let (mut state, ids) = with_notes(&refs);
        for id in &ids {
            assert!(state.open_in_pane(Pane::Left, id));
        }
        assert_eq!(state.tabs.left.len(), TAB_CAP);
        assert_eq!(state.active.left.as_deref(), Some(ids[11].as_str()));
    }

    #[test]
    fn toggle_split_fills_right_pane_with_other_note() {
        let (mut state, ids) = with_notes(&["a", "b"]);
        state.open_in_pane(Pane::Left, &ids[1]);
        assert!(state.toggle_split());
        assert_eq!(state.active.right.as_deref(), Some(ids[0].as_str()));
        assert!(!state.toggle_split());
    }

    #[test]
    fn tags_add_and_remove() {
        let (mut state, ids) = with_notes(&["a"]);
        assert!(state.add_tag(&ids[0], " Work ", now()));
        assert!(!state.add_tag(&ids[0], "work", now()));
        assert!(!state.add_tag(&ids[0], "  ", now()));
        assert_eq!(state.note(&ids[0]).unwrap().tags, vec!["Work"]);
        assert!(state.remove_tag(&ids[0], "WORK", now()));
        assert!(!state.remove_tag(&ids[0], "work", now()));
    }

    #[test]
    fn sorted_notes_puts_pinned_first() {
        let (mut state, ids) = with_notes(&["old", "new"]);
        state.toggle_pin(&ids[0], now() - Duration::hours(1));
        let order: Vec<&str> = state.sorted_notes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(order, vec!["old", "new"]);
    }

    #[test]
    fn visible_notes_filters_and_queries() {
        let (mut state, ids) = with_notes(&["Groceries", "Standup"]);
        state.update_note(&ids[1], NotePatch::body("<p>blockers: none</p>"), now());
        state.query = "BLOCKERS".into();
        let hits: Vec<&str> = state.visible_notes(now()).iter().map(|n| n.title.as_str()).collect();
        assert_eq!(hits, vec!["Standup"]);

        state.query.clear();
        state.filter = Filter::Pinned;
        assert!(state.visible_notes(now()).is_empty());

        state.filter = Filter::Recent;
        assert_eq!(state.visible_notes(now() + Duration::days(8)).len(), 0);
        assert_eq!(state.visible_notes(now()).len(), 2);
    }

    #[test]
    fn activity_is_capped() {
        let (mut state, ids) = with_notes(&["a"]);
        for _ in 0..(ACTIVITY_CAP + 25) {
            state.update_note(&ids[0], NotePatch::title("x"), now());
        }
        assert_eq!(state.activity.len(), ACTIVITY_CAP);
    }

    #[test]
    fn import_merges_incoming_wins() {
        let (mut state, ids) = with_notes(&["mine"]);
        let mut incoming = state.clone();
        incoming.notes[0].title = "theirs".into();
        let (extra, _) = with_notes(&["extra"]);
        incoming.notes.extend(extra.notes);

        assert_eq!(state.import_state(incoming, now()), 2);
        assert_eq!(state.notes.len(), 2);
        assert_eq!(state.note(&ids[0]).unwrap().title, "theirs");
        assert!(state.active.left.is_some());
        assert_eq!(state.activity[0].kind, ActivityKind::Import);
    }

    #[test]
    fn filter_tolerates_unknown_values() {
        let state: AppState = serde_json::from_str(r#"{"filter":"starred"}"#).unwrap();
        assert_eq!(state.filter, Filter::All);
    }

    #[test]
    fn normalize_repairs_dangling_references() {
        let (mut state, ids) = with_notes(&["a", "b"]);
        state.tabs.left = vec!["ghost".into(), ids[0].clone(), ids[0].clone()];
        state.active.left = Some("ghost".into());
        state.active.right = Some("ghost".into());
        let dup = state.notes[0].clone();
        state.notes.push(dup);

        let repairs = state.normalize();
        assert!(repairs >= 3);
        assert_eq!(state.notes.len(), 2);
        assert_eq!(state.tabs.left, vec![ids[0].clone()]);
        assert_eq!(state.active.left.as_deref(), Some(ids[0].as_str()));
        assert_eq!(state.active.right, None);
    }

    #[test]
    fn seeded_state_has_one_open_note() {
        let state = AppState::seeded(now());
        assert_eq!(state.notes.len(), 1);
        assert!(state.notes[0].pinned);
        assert_eq!(state.active.left.as_deref(), Some(state.notes[0].id.as_str()));
        assert!(state.activity.is_empty());
    }

    #[test]
    fn filter_names_round_trip_and_unknown_loads_as_all() {
        for (filter, name) in [
            (Filter::All, "\"all\""),
            (Filter::Pinned, "\"pinned\""),
            (Filter::Recent, "\"recent\""),
        ] {
            assert_eq!(serde_json::to_string(&filter).unwrap(), name);
            assert_eq!(serde_json::from_str::<Filter>(name).unwrap(), filter);
        }
        assert_eq!(serde_json::from_str::<Filter>("\"starred\"").unwrap(), Filter::All);
    }
}
