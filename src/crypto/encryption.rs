//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! Vault entries are keyed by short alphanumeric strings held in the key
//! directory.  `encrypt_with_key` / `decrypt_with_key` stretch such a
//! string into a 256-bit key before handing it to the cipher.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroize;

use super::keys::derive_entry_key;
use crate::errors::{HoneyVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| HoneyVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| HoneyVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Expects the first 12 bytes to be the nonce, followed by the ciphertext.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN {
        return Err(HoneyVaultError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| HoneyVaultError::DecryptionFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| HoneyVaultError::DecryptionFailed)
}

/// Encrypt a UTF-8 value under an alphanumeric entry key.
pub fn encrypt_with_key(entry_key: &str, plaintext: &str) -> Result<Vec<u8>> {
    let mut key = derive_entry_key(entry_key)?;
    let sealed = encrypt(&key, plaintext.as_bytes());
    key.zeroize();
    sealed
}

/// Decrypt a value sealed by `encrypt_with_key`.
///
/// Fails with `DecryptionFailed` for a wrong key, tampered bytes, or a
/// plaintext that is not valid UTF-8.
pub fn decrypt_with_key(entry_key: &str, sealed: &[u8]) -> Result<String> {
    let mut key = derive_entry_key(entry_key)?;
    let opened = decrypt(&key, sealed);
    key.zeroize();

    String::from_utf8(opened?).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        HoneyVaultError::DecryptionFailed
    })
}
