//! Password-level sealing: key derivation plus AEAD in one call.
//!
//! Every `seal` draws a fresh salt and nonce, so the derived key is new
//! for each payload and a nonce can never repeat under the same key.

use zeroize::Zeroize;

use super::encryption::{self, NONCE_LEN};
use super::kdf::{self, Pbkdf2Params, SALT_LEN};
use crate::errors::{NoteVaultError, Result};

/// The three values needed to reopen an encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `password` with the default KDF params.
pub fn seal(password: &[u8], plaintext: &[u8]) -> Result<SealedPayload> {
    seal_with_params(password, plaintext, &Pbkdf2Params::default())
}

/// Encrypt `plaintext` under `password` with explicit KDF params.
pub fn seal_with_params(
    password: &[u8],
    plaintext: &[u8],
    params: &Pbkdf2Params,
) -> Result<SealedPayload> {
    let salt = kdf::generate_salt();
    let nonce = encryption::generate_nonce();
    let key = kdf::derive_key_with_params(password, &salt, params)?;
    let ciphertext = encryption::encrypt(&key, &nonce, plaintext)?;

    Ok(SealedPayload {
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Decrypt a payload produced by `seal`.
pub fn open(password: &[u8], payload: &SealedPayload) -> Result<Vec<u8>> {
    open_with_params(password, payload, &Pbkdf2Params::default())
}

/// Decrypt a payload with explicit KDF params.
///
/// Returns `AuthenticationFailed` for a wrong password, a tampered
/// ciphertext, malformed salt/nonce and unusable KDF params alike.
pub fn open_with_params(
    password: &[u8],
    payload: &SealedPayload,
    params: &Pbkdf2Params,
) -> Result<Vec<u8>> {
    if payload.salt.len() != SALT_LEN || payload.nonce.len() != NONCE_LEN {
        return Err(NoteVaultError::AuthenticationFailed);
    }

    let key = kdf::derive_key_with_params(password, &payload.salt, params)
        .map_err(|_| NoteVaultError::AuthenticationFailed)?;
    encryption::decrypt(&key, &payload.nonce, &payload.ciphertext)
}

/// Open a payload and decode it as UTF-8, wiping the bytes on failure.
pub fn open_string(
    password: &[u8],
    payload: &SealedPayload,
    params: &Pbkdf2Params,
) -> Result<String> {
    let bytes = open_with_params(password, payload, params)?;
    String::from_utf8(bytes).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        NoteVaultError::AuthenticationFailed
    })
}
