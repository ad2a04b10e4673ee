//! Integration tests for the NoteVault crypto module.

use notevault::crypto::encryption::{decrypt, encrypt, generate_nonce, NONCE_LEN, TAG_LEN};
use notevault::crypto::kdf::{SALT_LEN, MIN_ITERATIONS};
use notevault::crypto::{
    derive_key, derive_key_with_params, generate_salt, open, open_string, open_with_params, seal,
    seal_with_params, Pbkdf2Params,
};
use notevault::errors::NoteVaultError;

/// Cheap params so the suite stays fast; the default count is covered once.
const FAST: Pbkdf2Params = Pbkdf2Params {
    iterations: MIN_ITERATIONS,
};

// ---------------------------------------------------------------------------
// Sealing round-trip
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip_with_default_params() {
    let plaintext = br#"{"notes":[{"id":"a","title":"A"}]}"#;

    let sealed = seal(b"hunter2", plaintext).expect("seal should succeed");
    assert_eq!(sealed.salt.len(), SALT_LEN);
    assert_eq!(sealed.nonce.len(), NONCE_LEN);
    assert_eq!(sealed.ciphertext.len(), plaintext.len() + TAG_LEN);

    let recovered = open(b"hunter2", &sealed).expect("open should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn roundtrip_holds_for_assorted_inputs() {
    let passwords: [&[u8]; 3] = [b"x", b"correct horse battery staple", "pässwörd".as_bytes()];
    let payloads: [&[u8]; 3] = [b"", b"{}", &[0u8; 4096]];

    for pw in passwords {
        for data in payloads {
            let sealed = seal_with_params(pw, data, &FAST).unwrap();
            assert_eq!(open_with_params(pw, &sealed, &FAST).unwrap(), data);
        }
    }
}

#[test]
fn sealing_twice_never_repeats_salt_or_nonce() {
    let a = seal_with_params(b"pw", b"same text", &FAST).unwrap();
    let b = seal_with_params(b"pw", b"same text", &FAST).unwrap();

    // Fresh randomness per call, so the outputs must differ entirely.
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);
}

// ---------------------------------------------------------------------------
// Failure modes are indistinguishable
// ---------------------------------------------------------------------------

#[test]
fn wrong_password_is_authentication_failure() {
    let sealed = seal_with_params(b"hunter2", b"secret notes", &FAST).unwrap();
    let err = open_with_params(b"hunter3", &sealed, &FAST).unwrap_err();
    assert!(matches!(err, NoteVaultError::AuthenticationFailed));
}

#[test]
fn every_flipped_ciphertext_bit_is_rejected() {
    let sealed = seal_with_params(b"pw", b"tamper me", &FAST).unwrap();

    for byte in 0..sealed.ciphertext.len() {
        for bit in [0x01u8, 0x80] {
            let mut tampered = sealed.clone();
            tampered.ciphertext[byte] ^= bit;
            assert!(
                matches!(
                    open_with_params(b"pw", &tampered, &FAST),
                    Err(NoteVaultError::AuthenticationFailed)
                ),
                "flip at byte {byte} must be rejected"
            );
        }
    }
}

#[test]
fn tampered_salt_or_nonce_is_rejected() {
    let sealed = seal_with_params(b"pw", b"data", &FAST).unwrap();

    let mut bad_salt = sealed.clone();
    bad_salt.salt[0] ^= 1;
    let mut bad_nonce = sealed.clone();
    bad_nonce.nonce[0] ^= 1;
    let mut short_nonce = sealed.clone();
    short_nonce.nonce.pop();

    for payload in [bad_salt, bad_nonce, short_nonce] {
        assert!(matches!(
            open_with_params(b"pw", &payload, &FAST),
            Err(NoteVaultError::AuthenticationFailed)
        ));
    }
}

#[test]
fn wrong_password_and_corruption_share_one_message() {
    let sealed = seal_with_params(b"pw", b"data", &FAST).unwrap();
    let wrong = open_with_params(b"nope", &sealed, &FAST).unwrap_err();

    let mut corrupt = sealed.clone();
    corrupt.ciphertext[0] ^= 1;
    let tampered = open_with_params(b"pw", &corrupt, &FAST).unwrap_err();

    assert_eq!(wrong.to_string(), tampered.to_string());
}

#[test]
fn open_string_rejects_non_utf8_as_authentication_failure() {
    let sealed = seal_with_params(b"pw", &[0xff, 0xfe, 0xfd], &FAST).unwrap();
    assert!(matches!(
        open_string(b"pw", &sealed, &FAST),
        Err(NoteVaultError::AuthenticationFailed)
    ));

    let sealed = seal_with_params(b"pw", "héllo".as_bytes(), &FAST).unwrap();
    assert_eq!(open_string(b"pw", &sealed, &FAST).unwrap(), "héllo");
}

// ---------------------------------------------------------------------------
// Raw AEAD
// ---------------------------------------------------------------------------

#[test]
fn raw_encrypt_decrypt_with_derived_key() {
    let salt = generate_salt();
    let key = derive_key_with_params(b"pw", &salt, &FAST).unwrap();
    let nonce = generate_nonce();

    let ct = encrypt(&key, &nonce, b"hello").unwrap();
    assert_eq!(decrypt(&key, &nonce, &ct).unwrap(), b"hello");

    let other = derive_key_with_params(b"other", &salt, &FAST).unwrap();
    assert!(matches!(
        decrypt(&other, &nonce, &ct),
        Err(NoteVaultError::AuthenticationFailed)
    ));
}

// ---------------------------------------------------------------------------
// Key derivation (PBKDF2)
// ---------------------------------------------------------------------------

#[test]
fn derive_key_is_deterministic_per_salt() {
    let salt = [7u8; SALT_LEN];
    let a = derive_key(b"pw", &salt).unwrap();
    let b = derive_key(b"pw", &salt).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    let c = derive_key_with_params(b"pw", &[8u8; SALT_LEN], &Pbkdf2Params::default()).unwrap();
    assert_ne!(a.as_bytes(), c.as_bytes());
}

#[test]
fn too_few_iterations_are_rejected() {
    let weak = Pbkdf2Params {
        iterations: MIN_ITERATIONS - 1,
    };
    assert!(matches!(
        derive_key_with_params(b"pw", &[0u8; SALT_LEN], &weak),
        Err(NoteVaultError::KeyDerivationFailed(_))
    ));
    assert!(seal_with_params(b"pw", b"x", &weak).is_err());
}
