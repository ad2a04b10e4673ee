//! Vault module: the encrypted-at-rest mode of the document store.
//!
//! This module provides:
//! - The durable `VaultMeta` record (`meta`)
//! - `LockState`, the observable lifecycle state
//!
//! The transitions themselves live on `Notebook` (see
//! `notebook::lifecycle`), which owns the state they act on.

pub mod meta;

pub use meta::{StoredVault, VaultMeta};

/// Where a notebook is in the vault lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Encryption is off; state is stored as plaintext.
    NoVault,
    /// Encryption is on and the notes are in memory.
    Unlocked,
    /// Encryption is on and memory holds nothing.
    Locked,
}

impl LockState {
    pub fn is_enabled(self) -> bool {
        !matches!(self, LockState::NoVault)
    }

    pub fn label(self) -> &'static str {
        match self {
            LockState::NoVault => "disabled",
            LockState::Unlocked => "unlocked",
            LockState::Locked => "locked",
        }
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
