//! The row type stored in a vault's entry collection.
//!
//! Real entries and decoys share this exact shape: nothing here says which
//! is which.  Authenticity lives only in the key directory.

use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_encode};

/// A single encrypted entry stored in a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    /// Credential name shared by the real entry and its decoys.
    pub name: String,

    /// The secret the caller presents to fetch this entry.
    pub secret: String,

    /// Nonce + ciphertext of the value, sealed under the entry's directory key.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub encrypted_value: Vec<u8>,
}

impl VaultEntry {
    /// Returns `true` if this row answers to `(name, secret)`.
    pub fn matches(&self, name: &str, secret: &str) -> bool {
        self.name == name && self.secret == secret
    }
}
