//! Cryptographic primitives for NoteVault.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Zeroizing key and password holders (`keys`)
//! - One-shot password sealing with fresh salt + nonce (`sealed`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod sealed;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, ...};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, Pbkdf2Params};
pub use keys::{CachedPassword, DerivedKey};
pub use sealed::{open, open_string, open_with_params, seal, seal_with_params, SealedPayload};
