//! Debounced persistence.
//!
//! Every mutation schedules a save; a burst of mutations collapses into
//! one cycle after the debounce window.  A cycle:
//!
//! 1. takes snapshots of the notes open in either pane, when due;
//! 2. samples lock state, password and store contents in one critical
//!    section;
//! 3. writes a sealed vault record (vault on) or the plaintext state
//!    (vault off).  While locked nothing is written.
//!
//! Encryption failures never fall back to a plaintext write.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

use zeroize::Zeroizing;

use super::Notebook;
use crate::crypto::{self, CachedPassword};
use crate::errors::NoteVaultError;
use crate::history;
use crate::storage::keys;
use crate::store::ActivityKind;
use crate::vault::{LockState, VaultMeta};

/// Outcome of the most recent save, as published to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    /// Nothing has been scheduled yet.
    Idle,
    /// A save is scheduled or running.
    Saving,
    /// The last cycle reached durable storage.
    Saved,
    /// The last cycle did not reach durable storage.
    Failed(SaveFailure),
}

impl PersistStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, PersistStatus::Failed(_))
    }
}

impl std::fmt::Display for PersistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistStatus::Idle => f.write_str("idle"),
            PersistStatus::Saving => f.write_str("saving"),
            PersistStatus::Saved => f.write_str("saved"),
            PersistStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Why a save did not land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFailure {
    /// The vault locked before the save ran; edits made in the window
    /// were cleared with the rest of memory.
    VaultLocked,
    /// Sealing the state failed.  Nothing was written.
    Encryption(String),
    /// The store refused the write; the session is memory-only until a
    /// later write succeeds.
    StorageUnavailable(String),
    /// The state could not be serialized.
    Serialization(String),
}

impl SaveFailure {
    /// Whether a later cycle can be expected to succeed on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SaveFailure::VaultLocked | SaveFailure::StorageUnavailable(_)
        )
    }
}

impl std::fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveFailure::VaultLocked => f.write_str("vault is locked"),
            SaveFailure::Encryption(e) => write!(f, "encryption failed: {e}"),
            SaveFailure::StorageUnavailable(e) => write!(f, "storage unavailable: {e}"),
            SaveFailure::Serialization(e) => write!(f, "serialization failed: {e}"),
        }
    }
}

/// What the sampled state says to write.
enum WritePlan {
    Plain(Zeroizing<String>),
    Sealed(CachedPassword, Zeroizing<String>),
    Skip(SaveFailure),
}

impl Notebook {
    /// Request a save after the debounce window.
    ///
    /// Safe to call on every keystroke.  Requires a tokio runtime.
    pub fn schedule_persist(&self) {
        self.inner.persist_status.send_replace(PersistStatus::Saving);
        self.inner.saver.schedule();
    }

    /// Cancel any pending save and run one now.
    pub async fn flush(&self) -> PersistStatus {
        self.inner.saver.cancel_pending();
        self.persist_cycle().await
    }

    pub fn persist_status(&self) -> PersistStatus {
        self.inner.persist_status.borrow().clone()
    }

    pub fn subscribe_persist_status(&self) -> tokio::sync::watch::Receiver<PersistStatus> {
        self.inner.persist_status.subscribe()
    }

    /// `true` after a storage write failed, until one succeeds again.
    pub fn is_degraded(&self) -> bool {
        self.inner.degraded.load(Ordering::SeqCst)
    }

    /// One full save cycle.  Publishes and returns the resulting status.
    pub(super) async fn persist_cycle(&self) -> PersistStatus {
        let _write = self.inner.write_gate.lock().await;

        let status = match self.plan_write() {
            WritePlan::Skip(failure) => PersistStatus::Failed(failure),
            WritePlan::Plain(json) => self.write_record(keys::PLAIN_STATE, &json),
            WritePlan::Sealed(password, json) => {
                let params = self.inner.options.kdf;
                let sealed = tokio::task::spawn_blocking(move || {
                    crypto::seal_with_params(password.as_bytes(), json.as_bytes(), &params)
                })
                .await;

                match sealed {
                    Ok(Ok(payload)) => match VaultMeta::from_sealed(payload, &params).to_json() {
                        Ok(record) => self.write_record(keys::VAULT_META, &record),
                        Err(e) => PersistStatus::Failed(SaveFailure::Serialization(e.to_string())),
                    },
                    Ok(Err(e)) => PersistStatus::Failed(SaveFailure::Encryption(e.to_string())),
                    Err(join) => PersistStatus::Failed(SaveFailure::Encryption(join.to_string())),
                }
            }
        };

        match &status {
            PersistStatus::Failed(failure) => tracing::warn!(%failure, "save failed"),
            _ => tracing::debug!("saved"),
        }
        self.inner.persist_status.send_replace(status.clone());
        status
    }

    /// Take due snapshots, then decide what to write from one consistent
    /// view of the session.
    fn plan_write(&self) -> WritePlan {
        let mut session = self.inner.session.lock();
        if session.lock == LockState::Locked {
            return WritePlan::Skip(SaveFailure::VaultLocked);
        }

        let now = self.now();
        let snap_mins = session.prefs.snap_mins;
        let state = &mut session.state;
        for id in state.active_note_ids() {
            let Some(note) = state.note_mut(&id) else {
                continue;
            };
            if history::snapshot_if_due(note, now, snap_mins) {
                let count = note.history.len();
                let mut meta = BTreeMap::new();
                meta.insert("count".to_string(), serde_json::Value::from(count));
                state.log_event(ActivityKind::Snapshot, Some(&id), meta, now);
                tracing::debug!(note = %id, count, "snapshot taken");
            }
        }

        let json = match serde_json::to_string(&session.state) {
            Ok(json) => Zeroizing::new(json),
            Err(e) => return WritePlan::Skip(SaveFailure::Serialization(e.to_string())),
        };

        match (session.lock, &session.password) {
            (LockState::NoVault, _) => WritePlan::Plain(json),
            (LockState::Unlocked, Some(password)) => WritePlan::Sealed(password.clone(), json),
            (LockState::Unlocked, None) => WritePlan::Skip(SaveFailure::Encryption(
                "no password cached for an unlocked vault".into(),
            )),
            (LockState::Locked, _) => WritePlan::Skip(SaveFailure::VaultLocked),
        }
    }

    /// Write one record, tracking the degraded flag.
    pub(super) fn write_record(&self, key: &str, value: &str) -> PersistStatus {
        match self.inner.store.set(key, value) {
            Ok(()) => {
                if self.inner.degraded.swap(false, Ordering::SeqCst) {
                    tracing::info!("storage is writable again");
                }
                PersistStatus::Saved
            }
            Err(e) => {
                if !self.inner.degraded.swap(true, Ordering::SeqCst) {
                    tracing::warn!(error = %e, "storage unavailable, continuing in memory only");
                }
                let reason = match e {
                    NoteVaultError::StorageUnavailable(reason) => reason,
                    other => other.to_string(),
                };
                PersistStatus::Failed(SaveFailure::StorageUnavailable(reason))
            }
        }
    }
}
