//! The durable vault record.
//!
//! Stored as JSON under `keys::VAULT_META`:
//!
//! ```text
//! {"enabled":true,"saltB64":"…","nonceB64":"…","cipherB64":"…","kdfIterations":120000}
//! ```
//!
//! Binary fields are base64 strings.  `kdfIterations` is optional; records
//! without it were sealed with the default count.

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{MAX_ITERATIONS, MIN_ITERATIONS};
use crate::crypto::{Pbkdf2Params, SealedPayload};
use crate::errors::{NoteVaultError, Result};
use crate::storage::{keys, KvStore};

/// Salt, nonce and ciphertext of the encrypted `AppState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMeta {
    pub enabled: bool,

    #[serde(
        rename = "saltB64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub salt: Vec<u8>,

    /// Older records call this the IV.
    #[serde(
        rename = "nonceB64",
        alias = "ivB64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub nonce: Vec<u8>,

    #[serde(
        rename = "cipherB64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub ciphertext: Vec<u8>,

    /// PBKDF2 iterations used when sealing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf_iterations: Option<u32>,
}

impl VaultMeta {
    /// Build an enabled record from a freshly sealed payload.
    pub fn from_sealed(sealed: SealedPayload, params: &Pbkdf2Params) -> Self {
        Self {
            enabled: true,
            salt: sealed.salt,
            nonce: sealed.nonce,
            ciphertext: sealed.ciphertext,
            kdf_iterations: Some(params.iterations),
        }
    }

    /// The payload to hand to `crypto::open_with_params`.
    pub fn payload(&self) -> SealedPayload {
        SealedPayload {
            salt: self.salt.clone(),
            nonce: self.nonce.clone(),
            ciphertext: self.ciphertext.clone(),
        }
    }

    /// The KDF params this record was sealed with.
    pub fn kdf_params(&self) -> Pbkdf2Params {
        self.kdf_iterations
            .map_or_else(Pbkdf2Params::default, |iterations| Pbkdf2Params {
                iterations,
            })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| NoteVaultError::SerializationError(format!("vault meta: {e}")))
    }

    /// Read the record from storage.
    ///
    /// A record that exists but cannot be used is reported as
    /// `StoredVault::Damaged`, never as absent: the vault stays on and
    /// opening it fails like a wrong password.  Only a missing key or an
    /// explicit `"enabled": false` means there is no vault.
    pub fn load(store: &dyn KvStore) -> Result<StoredVault> {
        let Some(raw) = store.get(keys::VAULT_META)? else {
            return Ok(StoredVault::Absent);
        };

        let value = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "stored vault record is not JSON");
                return Ok(StoredVault::Damaged);
            }
        };
        if value.get("enabled") == Some(&serde_json::Value::Bool(false)) {
            return Ok(StoredVault::Absent);
        }

        match serde_json::from_value::<VaultMeta>(value) {
            Ok(meta) if meta.is_usable() => Ok(StoredVault::Sealed(meta)),
            Ok(_) => {
                tracing::warn!("stored vault record is incomplete");
                Ok(StoredVault::Damaged)
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored vault record is unreadable");
                Ok(StoredVault::Damaged)
            }
        }
    }

    /// Write the record to storage as one atomic value.
    pub fn save(&self, store: &dyn KvStore) -> Result<()> {
        store.set(keys::VAULT_META, &self.to_json()?)
    }

    fn is_usable(&self) -> bool {
        let iterations_ok = self
            .kdf_iterations
            .map_or(true, |n| (MIN_ITERATIONS..=MAX_ITERATIONS).contains(&n));
        self.enabled
            && iterations_ok
            && !self.salt.is_empty()
            && !self.nonce.is_empty()
            && !self.ciphertext.is_empty()
    }
}

/// What storage holds under the vault key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredVault {
    /// No vault: the key is missing or the record is marked disabled.
    Absent,
    /// A complete sealed record.
    Sealed(VaultMeta),
    /// A record is present but cannot be parsed or used.
    Damaged,
}

impl StoredVault {
    /// Whether encryption is on, readable or not.
    pub fn is_present(&self) -> bool {
        !matches!(self, StoredVault::Absent)
    }

    pub fn into_meta(self) -> Option<VaultMeta> {
        match self {
            StoredVault::Sealed(meta) => Some(meta),
            StoredVault::Absent | StoredVault::Damaged => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
