//! Key derivation helpers using HKDF-SHA256.
//!
//! From a vault's stretched master key we derive:
//! - A **verifier** stored in the master registry, so the master key
//!   itself never touches disk.
//! - A dedicated **HMAC key** for the vault's entry file.
//!
//! Entry keys handed out by the key directory are short alphanumeric
//! strings; `derive_entry_key` turns one into a 256-bit cipher key.

use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{HoneyVaultError, Result};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

/// Derive the AES key for a single vault entry from its directory key.
pub fn derive_entry_key(entry_key: &str) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(entry_key.as_bytes(), b"honeyvault-entry-key")
}

/// Derive the registry verifier from a stretched master key.
pub fn derive_verifier(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"honeyvault-master-verifier")
}

/// Derive an HMAC key from the master key.
///
/// This key authenticates the vault's entry file so tampering is caught
/// before any entry is handed to the key directory lookup path.
pub fn derive_hmac_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"honeyvault-hmac-key")
}

/// Internal helper: run HKDF-SHA256 expand with the given `info`.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| HoneyVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A wrapper around a 32-byte stretched master key that automatically
/// zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Derive the registry verifier from this master key.
    pub fn derive_verifier(&self) -> Result<[u8; KEY_LEN]> {
        derive_verifier(&self.bytes)
    }

    /// Derive an HMAC key from this master key.
    pub fn derive_hmac_key(&self) -> Result<[u8; KEY_LEN]> {
        derive_hmac_key(&self.bytes)
    }

    /// Compare this key's verifier with a stored one in constant time.
    pub fn matches_verifier(&self, stored: &[u8]) -> Result<bool> {
        let mut verifier = self.derive_verifier()?;
        let matches = bool::from(verifier.as_slice().ct_eq(stored));
        verifier.zeroize();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_keys_are_independent() {
        let master = [7u8; KEY_LEN];
        assert_ne!(
            derive_verifier(&master).unwrap(),
            derive_hmac_key(&master).unwrap()
        );
    }

    #[test]
    fn matches_own_verifier_only() {
        let key = MasterKey::new([1u8; KEY_LEN]);
        let other = MasterKey::new([2u8; KEY_LEN]);
        let stored = key.derive_verifier().unwrap();

        assert!(key.matches_verifier(&stored).unwrap());
        assert!(!other.matches_verifier(&stored).unwrap());
        assert!(!key.matches_verifier(&stored[..16]).unwrap());
    }

    #[test]
    fn entry_key_is_deterministic() {
        assert_eq!(
            derive_entry_key("abc").unwrap(),
            derive_entry_key("abc").unwrap()
        );
        assert_ne!(
            derive_entry_key("abc").unwrap(),
            derive_entry_key("abd").unwrap()
        );
    }
}
