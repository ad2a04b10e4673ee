//! Vault lifecycle transitions.
//!
//! ```text
//!            enable_vault(pw)             lock()
//!   NoVault ─────────────────▶ Unlocked ─────────▶ Locked
//!      ▲                          ▲                  │
//!      │                          └──── unlock(pw) ──┘
//!      └──────────── wipe_vault() ───────────────────┘
//! ```
//!
//! Transitions hold the lifecycle gate for their whole duration; a second
//! transition attempted meanwhile fails with `ConcurrentOperation`.  They
//! also hold the write gate, so no save cycle interleaves with them.

use std::collections::BTreeMap;

use zeroize::Zeroizing;

use super::Notebook;
use crate::crypto::{self, CachedPassword};
use crate::errors::{NoteVaultError, Result};
use crate::storage::keys;
use crate::store::{ActivityKind, AppState};
use crate::vault::{LockState, StoredVault, VaultMeta};

impl Notebook {
    /// Encrypt the current store under `password` and switch to
    /// `Unlocked`.  The plaintext record is removed from storage.
    pub async fn enable_vault(&self, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(NoteVaultError::InvalidPassword(
                "password must not be empty".into(),
            ));
        }
        let _gate = self.enter_lifecycle()?;
        let write = self.inner.write_gate.lock().await;

        let json = {
            let session = self.inner.session.lock();
            if session.lock != LockState::NoVault {
                return Err(NoteVaultError::VaultAlreadyEnabled);
            }
            serialize_state(&session.state)?
        };

        let password = CachedPassword::new(password);
        let params = self.inner.options.kdf;
        let sealed = {
            let password = password.clone();
            tokio::task::spawn_blocking(move || {
                crypto::seal_with_params(password.as_bytes(), json.as_bytes(), &params)
            })
            .await
            .map_err(|e| NoteVaultError::EncryptionFailed(e.to_string()))??
        };

        let store = self.inner.store.as_ref();
        VaultMeta::from_sealed(sealed, &params).save(store)?;
        if let Err(e) = store.remove(keys::PLAIN_STATE) {
            // Never leave both records behind.
            if let Err(rollback) = store.remove(keys::VAULT_META) {
                tracing::error!(error = %rollback, "could not roll back vault record");
            }
            return Err(e);
        }

        {
            let mut session = self.inner.session.lock();
            let now = self.now();
            session.password = Some(password);
            session.last_interaction = now;
            session
                .state
                .log_event(ActivityKind::VaultEnabled, None, BTreeMap::new(), now);
            self.set_lock_state(&mut session, LockState::Unlocked);
        }
        tracing::info!("vault enabled");

        // Seal the activity entry too.
        drop(write);
        self.schedule_persist();
        Ok(())
    }

    /// Clear everything from memory and switch to `Locked`.
    ///
    /// Waits for an in-flight save to land first.  Locking a locked vault
    /// does nothing.
    pub async fn lock(&self) -> Result<()> {
        let _gate = self.enter_lifecycle()?;
        let _write = self.inner.write_gate.lock().await;

        let mut session = self.inner.session.lock();
        match session.lock {
            LockState::NoVault => return Err(NoteVaultError::VaultNotEnabled),
            LockState::Locked => return Ok(()),
            LockState::Unlocked => {}
        }
        session.state = AppState::default();
        session.password = None;
        self.set_lock_state(&mut session, LockState::Locked);
        tracing::info!("vault locked");
        Ok(())
    }

    /// Decrypt the stored vault and switch to `Unlocked`.
    ///
    /// A wrong password or a damaged vault record leaves the vault
    /// `Locked` and returns `AuthenticationFailed`.
    pub async fn unlock(&self, password: &str) -> Result<()> {
        let _gate = self.enter_lifecycle()?;

        match self.lock_state() {
            LockState::NoVault => return Err(NoteVaultError::VaultNotEnabled),
            LockState::Unlocked => return Err(NoteVaultError::VaultNotLocked),
            LockState::Locked => {}
        }

        let meta = match VaultMeta::load(self.inner.store.as_ref())? {
            StoredVault::Sealed(meta) => meta,
            StoredVault::Damaged => {
                tracing::warn!("unlock failed: vault record is damaged");
                return Err(NoteVaultError::AuthenticationFailed);
            }
            StoredVault::Absent => return Err(NoteVaultError::VaultNotFound),
        };
        let password = CachedPassword::new(password);

        let json = {
            let password = password.clone();
            let payload = meta.payload();
            let params = meta.kdf_params();
            tokio::task::spawn_blocking(move || {
                crypto::open_string(password.as_bytes(), &payload, &params).map(Zeroizing::new)
            })
            .await
            .map_err(|e| NoteVaultError::EncryptionFailed(e.to_string()))?
        };
        let json = match json {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("unlock failed");
                return Err(e);
            }
        };

        let mut state =
            super::parse_state(&json).map_err(|_| NoteVaultError::AuthenticationFailed)?;
        let repairs = state.normalize();
        if repairs > 0 {
            tracing::warn!(repairs, "repaired decrypted state");
        }

        {
            let mut session = self.inner.session.lock();
            session.state = state;
            session.password = Some(password);
            session.last_interaction = self.now();
            self.set_lock_state(&mut session, LockState::Unlocked);
        }
        tracing::info!("vault unlocked");
        Ok(())
    }

    /// Delete the vault record and start over with a fresh plaintext
    /// store.  Irreversible.
    pub async fn wipe_vault(&self) -> Result<()> {
        let _gate = self.enter_lifecycle()?;
        let _write = self.inner.write_gate.lock().await;

        if self.lock_state() == LockState::NoVault {
            return Err(NoteVaultError::VaultNotEnabled);
        }

        self.inner.saver.cancel_pending();
        self.inner.store.remove(keys::VAULT_META)?;

        let now = self.now();
        let fresh = AppState::seeded(now);
        let json = serialize_state(&fresh)?;
        {
            let mut session = self.inner.session.lock();
            session.state = fresh;
            session.password = None;
            session.last_interaction = now;
            self.set_lock_state(&mut session, LockState::NoVault);
        }
        tracing::info!("vault wiped");

        let status = self.write_record(keys::PLAIN_STATE, &json);
        self.inner.persist_status.send_replace(status);
        Ok(())
    }

    fn enter_lifecycle(&self) -> Result<tokio::sync::MutexGuard<'_, ()>> {
        self.inner
            .lifecycle_gate
            .try_lock()
            .map_err(|_| NoteVaultError::ConcurrentOperation)
    }
}

fn serialize_state(state: &AppState) -> Result<Zeroizing<String>> {
    serde_json::to_string(state)
        .map(Zeroizing::new)
        .map_err(|e| NoteVaultError::SerializationError(format!("state: {e}")))
}
