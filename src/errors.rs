use thiserror::Error;

/// All errors that can occur in NoteVault.
#[derive(Debug, Error)]
pub enum NoteVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong password and corrupted ciphertext are deliberately the same
    /// variant with the same message.
    #[error("Authentication failed: wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault lifecycle errors ---
    #[error("Vault is not enabled")]
    VaultNotEnabled,

    #[error("Vault is already enabled")]
    VaultAlreadyEnabled,

    #[error("Vault is locked; unlock it first")]
    VaultLocked,

    #[error("Vault is not locked")]
    VaultNotLocked,

    #[error("No vault data found in storage")]
    VaultNotFound,

    #[error("Another vault operation is already in progress")]
    ConcurrentOperation,

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    // --- Document errors ---
    #[error("Note '{0}' not found")]
    NoteNotFound(String),

    #[error("Snapshot index {index} out of range (note has {len} snapshots)")]
    SnapshotOutOfRange { index: usize, len: usize },

    // --- Storage errors ---
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Editor error: {0}")]
    EditorError(String),
}

/// Convenience type alias for NoteVault results.
pub type Result<T> = std::result::Result<T, NoteVaultError>;
