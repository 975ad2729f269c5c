//! Honeyword batch construction.
//!
//! One `add` produces two parallel batches: the rows written to the vault
//! store (shuffled, no authenticity marker) and the records pushed to the
//! key directory (real record first, each decoy tagged `is_real = false`).

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::crypto::encryption::encrypt_with_key;
use crate::crypto::random::generate_key;
use crate::directory::KeyRecord;
use crate::errors::{HoneyVaultError, Result};
use crate::vault::VaultEntry;

/// Most candidates taken from one oracle answer.
pub const MAX_CANDIDATES: usize = 64;

/// Longest accepted name, secret or candidate, in characters.
pub const MAX_FIELD_LEN: usize = 256;

/// The two halves of an `add`.
#[derive(Debug)]
pub struct EntryBatch {
    /// Rows for the vault store, in storage order.
    pub local: Vec<VaultEntry>,
    /// Records for the key directory; index 0 is the real one.
    pub directory: Vec<KeyRecord>,
}

impl EntryBatch {
    pub fn decoy_count(&self) -> usize {
        self.directory.len().saturating_sub(1)
    }
}

/// Reject names and secrets the stores cannot key on.
pub fn validate_entry(name: &str, secret: &str) -> Result<()> {
    for (label, field) in [("name", name), ("secret", secret)] {
        if field.is_empty() {
            return Err(HoneyVaultError::InvalidEntry(format!(
                "entry {label} cannot be empty"
            )));
        }
        if field.chars().count() > MAX_FIELD_LEN {
            return Err(HoneyVaultError::InvalidEntry(format!(
                "entry {label} cannot exceed {MAX_FIELD_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Turn raw oracle output into usable decoy secrets.
///
/// Drops empty and over-long candidates, the real secret itself and
/// repeats, keeping the oracle's order, and stops at `MAX_CANDIDATES`.
pub fn usable_candidates(candidates: Vec<String>, real_secret: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.is_empty() && c.chars().count() <= MAX_FIELD_LEN && c != real_secret)
        .filter(|c| seen.insert(c.clone()))
        .take(MAX_CANDIDATES)
        .collect()
}

/// Build the real row plus one decoy per secret in `decoys`.
///
/// Every row gets its own key of `key_len` characters.  Decoy values are
/// random ASCII strings with the real value's byte length, so every
/// ciphertext in the group has the same size.
pub fn build<R: Rng + ?Sized>(
    rng: &mut R,
    vault_name: &str,
    name: &str,
    secret: &str,
    value: &str,
    decoys: &[String],
    key_len: usize,
) -> Result<EntryBatch> {
    let mut local = Vec::with_capacity(decoys.len() + 1);
    let mut directory = Vec::with_capacity(decoys.len() + 1);

    let real_key = generate_key(rng, key_len);
    local.push(VaultEntry {
        name: name.to_string(),
        secret: secret.to_string(),
        encrypted_value: encrypt_with_key(&real_key, value)?,
    });
    directory.push(KeyRecord {
        vault_name: vault_name.to_string(),
        name: name.to_string(),
        secret: secret.to_string(),
        key: real_key,
        is_real: true,
    });

    let filler_len = value.len();
    for decoy in decoys {
        let decoy_key = generate_key(rng, key_len);
        let filler = generate_key(rng, filler_len);
        local.push(VaultEntry {
            name: name.to_string(),
            secret: decoy.clone(),
            encrypted_value: encrypt_with_key(&decoy_key, &filler)?,
        });
        directory.push(KeyRecord {
            vault_name: vault_name.to_string(),
            name: name.to_string(),
            secret: decoy.clone(),
            key: decoy_key,
            is_real: false,
        });
    }

    local.shuffle(rng);

    Ok(EntryBatch { local, directory })
}
