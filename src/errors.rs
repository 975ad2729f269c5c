use thiserror::Error;

/// All errors that can occur in HoneyVault.
#[derive(Debug, Error)]
pub enum HoneyVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Invalid master key or vault")]
    Unauthorized,

    #[error("Invalid vault name '{0}': only ASCII letters and digits are allowed")]
    InvalidVaultName(String),

    #[error("Vault '{0}' already exists")]
    VaultAlreadyExists(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("HMAC verification failed: vault file may be tampered")]
    HmacMismatch,

    #[error("HMAC error: {0}")]
    HmacError(String),

    #[error("Entry '{name}' not found")]
    EntryNotFound { name: String },

    #[error("Entry '{0}' already exists in this vault (delete it first)")]
    EntryExists(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    // --- Detection outcomes ---
    #[error("Decoy entry accessed: alert recorded")]
    DecoyAccessed,

    #[error("Decoy entries cannot be deleted")]
    CannotDeleteDecoy,

    // --- Cross-store errors ---
    #[error("Partial failure: vault store updated but key directory was not: {0}")]
    PartialFailure(String),

    #[error("Key directory error: {0}")]
    DirectoryError(String),

    #[error("Decoy oracle unavailable: {0}")]
    OracleUnavailable(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for HoneyVault results.
pub type Result<T> = std::result::Result<T, HoneyVaultError>;
