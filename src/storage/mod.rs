//! Durable key/value storage.
//!
//! The core stores three records, each a JSON string under a fixed key:
//! the plaintext state, the vault metadata, and the preferences.  Any
//! backend that can get, set and remove strings by key will do.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::Result;

/// Well-known storage keys.
pub mod keys {
    /// Serialized `AppState`; present only while the vault is disabled.
    pub const PLAIN_STATE: &str = "notevault_state_v1";

    /// Serialized `VaultMeta`.
    pub const VAULT_META: &str = "notevault_vault_v1";

    /// Serialized `Preferences`.
    pub const PREFS: &str = "notevault_prefs_v1";
}

/// A string key/value store with durable writes.
///
/// Failures to write are reported as `StorageUnavailable`.
pub trait KvStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one atomically.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
