//! `Notebook`: the owned context tying the document store, the vault
//! lifecycle and the persistence scheduler together.
//!
//! A `Notebook` is cheap to clone; every clone shares the same session.
//! Independent notebooks over independent stores do not interact.
//!
//! Layout:
//! - this file: construction, boot, the note API and read access
//! - `lifecycle`: enable / lock / unlock / wipe
//! - `persist`: the debounced save cycle and its status signal
//! - `autolock`: inactivity tracking

mod autolock;
mod lifecycle;
mod persist;

pub use persist::{PersistStatus, SaveFailure};

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::clock::{Clock, SystemClock};
use crate::config::{Preferences, Settings};
use crate::crypto::{CachedPassword, Pbkdf2Params};
use crate::debounce::{ActionFuture, DebouncedTask};
use crate::errors::{NoteVaultError, Result};
use crate::history::{self, ContentDiff};
use crate::storage::{keys, KvStore};
use crate::store::{ActivityKind, AppState, Filter, Note, NoteId, NoteInit, NotePatch, Pane};
use crate::vault::{LockState, VaultMeta};

/// Tunables for a notebook session.
#[derive(Debug, Clone)]
pub struct NotebookOptions {
    /// Quiet period before a scheduled save runs.
    pub debounce: Duration,
    /// KDF params for newly sealed vault records.
    pub kdf: Pbkdf2Params,
    /// Period of the background auto-lock check.
    pub auto_lock_check: Duration,
}

impl Default for NotebookOptions {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<&Settings> for NotebookOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            debounce: settings.debounce(),
            kdf: settings.kdf_params(),
            auto_lock_check: settings.auto_lock_check(),
        }
    }
}

impl From<Settings> for NotebookOptions {
    fn from(settings: Settings) -> Self {
        Self::from(&settings)
    }
}

/// What `Notebook::open` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// Nothing stored yet; started from the seeded welcome state.
    Fresh,
    /// Plaintext state loaded cleanly.
    Loaded,
    /// Plaintext state loaded after repairing `repairs` problems.
    Recovered { repairs: usize },
    /// Stored plaintext state was unreadable and has been replaced by a
    /// fresh seeded state in memory.
    Reset,
    /// A vault record exists; the notebook starts locked.
    Locked,
}

/// Mutable session state.  Guarded by a synchronous mutex that is never
/// held across an `.await`.
struct Session {
    state: AppState,
    lock: LockState,
    password: Option<CachedPassword>,
    last_interaction: DateTime<Utc>,
    prefs: Preferences,
}

struct Inner {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    options: NotebookOptions,
    session: Mutex<Session>,
    /// Held for the whole of enable / lock / unlock / wipe; contention
    /// means `ConcurrentOperation`.
    lifecycle_gate: tokio::sync::Mutex<()>,
    /// Held around every durable write of state or vault records.
    write_gate: tokio::sync::Mutex<()>,
    lock_state: watch::Sender<LockState>,
    persist_status: watch::Sender<PersistStatus>,
    degraded: AtomicBool,
    saver: DebouncedTask,
}

/// An open note collection over one `KvStore`.
#[derive(Clone)]
pub struct Notebook {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Notebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notebook")
            .field("lock_state", &self.lock_state())
            .field("persist_status", &self.persist_status())
            .finish_non_exhaustive()
    }
}

impl Notebook {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open a notebook over `store` using the system clock.
    pub fn open(store: Arc<dyn KvStore>, options: NotebookOptions) -> Result<(Self, BootOutcome)> {
        Self::open_with_clock(store, Arc::new(SystemClock), options)
    }

    /// Open a notebook with an explicit clock.
    ///
    /// If a vault record exists, readable or not, the notebook starts
    /// `Locked` with an empty store; otherwise the plaintext state is
    /// loaded.
    pub fn open_with_clock(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        options: NotebookOptions,
    ) -> Result<(Self, BootOutcome)> {
        let now = clock.now();
        let prefs = Preferences::load(store.as_ref());

        let (state, lock, outcome) = if VaultMeta::load(store.as_ref())?.is_present() {
            if store.contains(keys::PLAIN_STATE)? {
                tracing::warn!("plaintext state found next to a vault record; removing it");
                if let Err(e) = store.remove(keys::PLAIN_STATE) {
                    tracing::warn!(error = %e, "could not remove stray plaintext state");
                }
            }
            (AppState::default(), LockState::Locked, BootOutcome::Locked)
        } else {
            let (state, outcome) = load_plain_state(store.as_ref(), now)?;
            (state, LockState::NoVault, outcome)
        };

        tracing::info!(?outcome, lock_state = %lock, "notebook opened");

        let session = Session {
            state,
            lock,
            password: None,
            last_interaction: now,
            prefs,
        };

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let saver = DebouncedTask::new(options.debounce, move || -> ActionFuture {
                let weak = weak.clone();
                Box::pin(async move {
                    if let Some(inner) = weak.upgrade() {
                        Notebook { inner }.persist_cycle().await;
                    }
                })
            });

            Inner {
                store,
                clock,
                options,
                session: Mutex::new(session),
                lifecycle_gate: tokio::sync::Mutex::new(()),
                write_gate: tokio::sync::Mutex::new(()),
                lock_state: watch::channel(lock).0,
                persist_status: watch::channel(PersistStatus::Idle).0,
                degraded: AtomicBool::new(false),
                saver,
            }
        });

        Ok((Self { inner }, outcome))
    }

    fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    // ------------------------------------------------------------------
    // Session access helpers
    // ------------------------------------------------------------------

    /// Run `f` against the live store, then schedule a save.
    ///
    /// Refused with `VaultLocked` while locked.  Counts as user activity.
    fn mutate<R>(&self, f: impl FnOnce(&mut AppState, DateTime<Utc>) -> R) -> Result<R> {
        let result = {
            let mut session = self.inner.session.lock();
            if session.lock == LockState::Locked {
                return Err(NoteVaultError::VaultLocked);
            }
            let now = self.now();
            session.last_interaction = now;
            f(&mut session.state, now)
        };
        self.schedule_persist();
        Ok(result)
    }

    /// Like `mutate`, but only schedules a save when `f` succeeds.
    fn try_mutate<R>(
        &self,
        f: impl FnOnce(&mut AppState, DateTime<Utc>) -> Result<R>,
    ) -> Result<R> {
        let result = {
            let mut session = self.inner.session.lock();
            if session.lock == LockState::Locked {
                return Err(NoteVaultError::VaultLocked);
            }
            let now = self.now();
            session.last_interaction = now;
            f(&mut session.state, now)?
        };
        self.schedule_persist();
        Ok(result)
    }

    fn read<R>(&self, f: impl FnOnce(&AppState, DateTime<Utc>) -> R) -> Result<R> {
        let session = self.inner.session.lock();
        if session.lock == LockState::Locked {
            return Err(NoteVaultError::VaultLocked);
        }
        Ok(f(&session.state, self.now()))
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// Create a note and show it in the left pane.
    pub fn create_note(&self, init: NoteInit) -> Result<NoteId> {
        self.mutate(|state, now| {
            let id = state.create_note(init, now).id.clone();
            state.open_in_pane(Pane::Left, &id);
            id
        })
    }

    /// Merge `patch` into a note.  Unknown ids return `Ok(false)`.
    pub fn update_note(&self, id: &str, patch: NotePatch) -> Result<bool> {
        self.mutate(|state, now| state.update_note(id, patch, now))
    }

    pub fn delete_note(&self, id: &str) -> Result<bool> {
        self.mutate(|state, now| state.delete_note(id, now))
    }

    pub fn duplicate_note(&self, id: &str) -> Result<Option<NoteId>> {
        self.mutate(|state, now| state.duplicate_note(id, now))
    }

    pub fn toggle_pin(&self, id: &str) -> Result<Option<bool>> {
        self.mutate(|state, now| state.toggle_pin(id, now))
    }

    pub fn add_tag(&self, id: &str, tag: &str) -> Result<bool> {
        self.mutate(|state, now| state.add_tag(id, tag, now))
    }

    pub fn remove_tag(&self, id: &str, tag: &str) -> Result<bool> {
        self.mutate(|state, now| state.remove_tag(id, tag, now))
    }

    /// Merge notes from another serialized state; returns how many arrived.
    pub fn import_state(&self, incoming: AppState) -> Result<usize> {
        self.mutate(|state, now| state.import_state(incoming, now))
    }

    /// Parse `json` as an `AppState` and merge it.
    ///
    /// The document must be a JSON object.
    pub fn import_json(&self, json: &str) -> Result<usize> {
        let incoming = parse_state(json)
            .map_err(|e| NoteVaultError::SerializationError(format!("import: {e}")))?;
        self.import_state(incoming)
    }

    pub fn open_in_pane(&self, pane: Pane, id: &str) -> Result<bool> {
        self.mutate(|state, _| state.open_in_pane(pane, id))
    }

    pub fn close_tab(&self, pane: Pane, id: &str) -> Result<bool> {
        self.mutate(|state, _| state.close_tab(pane, id))
    }

    pub fn toggle_split(&self) -> Result<bool> {
        self.mutate(|state, _| state.toggle_split())
    }

    pub fn set_filter(&self, filter: Filter) -> Result<()> {
        self.mutate(|state, _| state.filter = filter)
    }

    pub fn set_query(&self, query: impl Into<String>) -> Result<()> {
        let query = query.into();
        self.mutate(|state, _| state.query = query)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Restore a note from snapshot `index` (0 = oldest).
    pub fn restore_snapshot(&self, id: &str, index: usize) -> Result<()> {
        self.try_mutate(|state, now| {
            let note = state
                .note_mut(id)
                .ok_or_else(|| NoteVaultError::NoteNotFound(id.to_string()))?;
            history::restore(note, index, now)?;

            let mut meta = BTreeMap::new();
            meta.insert("index".to_string(), serde_json::Value::from(index));
            state.log_event(ActivityKind::Restore, Some(id), meta, now);
            tracing::debug!(note = %id, index, "restored snapshot");
            Ok(())
        })
    }

    /// Compare snapshot `index` of a note against its current body.
    pub fn diff_snapshot(&self, id: &str, index: usize) -> Result<ContentDiff> {
        self.read(|state, _| {
            let note = state
                .note(id)
                .ok_or_else(|| NoteVaultError::NoteNotFound(id.to_string()))?;
            let snapshot = note
                .history
                .get(index)
                .ok_or(NoteVaultError::SnapshotOutOfRange {
                    index,
                    len: note.history.len(),
                })?;
            Ok(history::diff(&snapshot.body, &note.body))
        })?
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// A copy of the whole store.  Fails with `VaultLocked` while locked.
    pub fn snapshot(&self) -> Result<AppState> {
        self.read(|state, _| state.clone())
    }

    pub fn note(&self, id: &str) -> Result<Option<Note>> {
        self.read(|state, _| state.note(id).cloned())
    }

    /// Notes passing the current filter and query, pinned first.
    pub fn visible_notes(&self) -> Result<Vec<Note>> {
        self.read(|state, now| state.visible_notes(now).into_iter().cloned().collect())
    }

    pub fn lock_state(&self) -> LockState {
        *self.inner.lock_state.borrow()
    }

    pub fn subscribe_lock_state(&self) -> watch::Receiver<LockState> {
        self.inner.lock_state.subscribe()
    }

    pub fn preferences(&self) -> Preferences {
        self.inner.session.lock().prefs
    }

    /// Replace the preferences and write them to storage.
    pub fn set_preferences(&self, prefs: Preferences) -> Result<()> {
        let prefs = prefs.clamped();
        self.inner.session.lock().prefs = prefs;
        prefs.save(self.inner.store.as_ref())
    }

    fn set_lock_state(&self, session: &mut Session, lock: LockState) {
        session.lock = lock;
        self.inner.lock_state.send_replace(lock);
    }
}

/// Load the plaintext state, falling back to a seeded store.
fn load_plain_state(store: &dyn KvStore, now: DateTime<Utc>) -> Result<(AppState, BootOutcome)> {
    let Some(raw) = store.get(keys::PLAIN_STATE)? else {
        return Ok((AppState::seeded(now), BootOutcome::Fresh));
    };

    match parse_state(&raw) {
        Ok(mut state) => {
            let repairs = state.normalize();
            if repairs == 0 {
                Ok((state, BootOutcome::Loaded))
            } else {
                tracing::warn!(repairs, "repaired stored state");
                Ok((state, BootOutcome::Recovered { repairs }))
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "stored state is unreadable, starting fresh");
            Ok((AppState::seeded(now), BootOutcome::Reset))
        }
    }
}

/// Parse a serialized `AppState`, which must be a JSON object.
///
/// serde would otherwise accept a bare array as a struct sequence.
pub(crate) fn parse_state(raw: &str) -> std::result::Result<AppState, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }
    serde_json::from_value(value)
}
