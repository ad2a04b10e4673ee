//! Locking after a period of inactivity.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::Notebook;
use crate::errors::{NoteVaultError, Result};
use crate::vault::LockState;

impl Notebook {
    /// Note user activity, pushing back the auto-lock deadline.
    pub fn record_interaction(&self) {
        let now = self.now();
        self.inner.session.lock().last_interaction = now;
    }

    /// Lock if unlocked and idle for longer than the configured
    /// `auto_lock_mins`.  Returns whether this call locked the vault.
    ///
    /// A transition already in flight is not an error here; the next
    /// check will try again.
    pub async fn check_auto_lock(&self) -> Result<bool> {
        let due = {
            let session = self.inner.session.lock();
            session.lock == LockState::Unlocked
                && self.now() - session.last_interaction > session.prefs.auto_lock_after()
        };
        if !due {
            return Ok(false);
        }

        match self.lock().await {
            Ok(()) => {
                tracing::info!("auto-locked after inactivity");
                Ok(true)
            }
            Err(NoteVaultError::ConcurrentOperation) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Run `check_auto_lock` every `auto_lock_check` until the notebook
    /// is dropped or the returned handle is aborted.
    pub fn spawn_auto_lock(&self) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.options.auto_lock_check;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = (Notebook { inner }).check_auto_lock().await {
                    tracing::warn!(error = %e, "auto-lock check failed");
                }
            }
        })
    }
}
