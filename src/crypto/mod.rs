//! Cryptographic primitives for HoneyVault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption, raw and string-keyed (`encryption`)
//! - Argon2id stretching of vault master keys (`kdf`)
//! - HKDF-based sub-key derivation and the zeroizing `MasterKey` (`keys`)
//! - Alphanumeric entry keys and decoy plaintexts (`random`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod random;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt_with_key, generate_key, ...};
pub use encryption::{decrypt, decrypt_with_key, encrypt, encrypt_with_key};
pub use kdf::{derive_master_key_with_params, generate_salt, Argon2Params};
pub use keys::{derive_entry_key, derive_hmac_key, derive_verifier, MasterKey};
pub use random::{generate_key, ENTRY_KEY_LEN};
