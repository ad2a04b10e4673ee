//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! 120 000 iterations puts a meaningful price on offline guessing while
//! still deriving in well under a second on commodity hardware.  The
//! iteration count is configurable via `Pbkdf2Params` (loaded from
//! `.notevault.toml` or the default) and recorded next to the ciphertext
//! so a vault always re-opens with the count it was sealed with.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use sha2::Sha256;

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{NoteVaultError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 120_000;

/// Smallest iteration count we are willing to run with.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Largest iteration count we are willing to run with.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Configurable PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Params {
    /// HMAC-SHA256 rounds (default: 120 000).
    pub iterations: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Derive a 32-byte key from a password and salt with the default params.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<DerivedKey> {
    derive_key_with_params(password, salt, &Pbkdf2Params::default())
}

/// Derive a 32-byte key with explicit PBKDF2 parameters.
///
/// The same password + salt + params always produce the same key.
/// Iteration counts outside `MIN_ITERATIONS..=MAX_ITERATIONS` are rejected.
pub fn derive_key_with_params(
    password: &[u8],
    salt: &[u8],
    params: &Pbkdf2Params,
) -> Result<DerivedKey> {
    if params.iterations < MIN_ITERATIONS {
        return Err(NoteVaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }
    if params.iterations > MAX_ITERATIONS {
        return Err(NoteVaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at most {MAX_ITERATIONS} (got {})",
            params.iterations
        )));
    }
    if salt.is_empty() {
        return Err(NoteVaultError::KeyDerivationFailed(
            "salt must not be empty".into(),
        ));
    }

    let mut key = DerivedKey::zeroed();
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, params.iterations, key.as_mut_bytes());
    debug_assert_eq!(key.as_bytes().len(), KEY_LEN);

    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
