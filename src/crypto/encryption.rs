//! AES-256-GCM authenticated encryption.
//!
//! Unlike a nonce-prefixed blob, the vault stores salt, nonce and
//! ciphertext as three separate fields, so both directions take the
//! nonce explicitly.  The ciphertext carries the 16-byte auth tag.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};

use super::keys::DerivedKey;
use crate::errors::{NoteVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Generate a random 12-byte nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` under `key` with the given `nonce`.
pub fn encrypt(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| NoteVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| NoteVaultError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Decrypt and verify data produced by `encrypt`.
///
/// Every failure mode maps to `AuthenticationFailed`.
pub fn decrypt(key: &DerivedKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(NoteVaultError::AuthenticationFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| NoteVaultError::AuthenticationFailed)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| NoteVaultError::AuthenticationFailed)
}
