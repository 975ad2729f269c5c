//! One vault's entry collection.
//!
//! `VaultStore` wraps the binary format layer so the service can work with
//! simple calls like `store.insert_batch(rows)` and `store.find("login", "p4ss")`.
//! A collection is materialized lazily: opening a vault that has never
//! received an entry yields an empty store, and the file appears on the
//! first `save`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::keys::MasterKey;
use crate::errors::Result;

use super::entry::VaultEntry;
use super::format::{self, VaultHeader};

/// Handle on a single vault's entries.
pub struct VaultStore {
    /// Path to the `.vault` file on disk.
    path: PathBuf,

    /// Header metadata (version, vault name, creation time).
    header: VaultHeader,

    /// Entries in storage order.
    entries: Vec<VaultEntry>,

    /// HMAC key derived from the vault's master key (zeroized on drop).
    hmac_key: Zeroizing<[u8; 32]>,
}

impl VaultStore {
    /// Path of the entry file for `vault_name` under `vaults_dir`.
    pub fn path_for(vaults_dir: &Path, vault_name: &str) -> PathBuf {
        vaults_dir.join(format!("{vault_name}.vault"))
    }

    /// Open a vault's entry collection, verifying its integrity.
    ///
    /// A missing file is an empty collection.
    pub fn open(vaults_dir: &Path, vault_name: &str, master_key: &MasterKey) -> Result<Self> {
        let path = Self::path_for(vaults_dir, vault_name);
        let hmac_key = Zeroizing::new(master_key.derive_hmac_key()?);

        if !path.exists() {
            debug!(vault = vault_name, "entry collection not materialized yet");
            return Ok(Self {
                path,
                header: VaultHeader::new(vault_name),
                entries: Vec::new(),
                hmac_key,
            });
        }

        let raw = format::read_entries(&path)?;
        format::verify_hmac(
            hmac_key.as_slice(),
            &raw.header_bytes,
            &raw.entries_bytes,
            &raw.stored_hmac,
        )?;

        Ok(Self {
            path,
            header: raw.header,
            entries: raw.entries,
            hmac_key,
        })
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Append a batch of rows in the order given.
    pub fn insert_batch(&mut self, batch: Vec<VaultEntry>) {
        self.entries.extend(batch);
    }

    /// First row answering to `(name, secret)`.
    pub fn find(&self, name: &str, secret: &str) -> Option<&VaultEntry> {
        self.entries.iter().find(|e| e.matches(name, secret))
    }

    /// Returns `true` if any row (real or decoy) carries `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Remove every row carrying `name` and return how many went.
    pub fn remove_group(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        before - self.entries.len()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the collection to disk atomically.
    pub fn save(&self) -> Result<()> {
        format::write_entries(
            &self.path,
            &self.header,
            &self.entries,
            self.hmac_key.as_slice(),
        )
    }

    /// Drop a vault's whole collection.  Returns `false` if nothing was on disk.
    pub fn destroy(vaults_dir: &Path, vault_name: &str) -> Result<bool> {
        let path = Self::path_for(vaults_dir, vault_name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the entry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the vault name recorded in the header.
    pub fn vault_name(&self) -> &str {
        &self.header.vault_name
    }

    /// Entries in storage order.
    pub fn entries(&self) -> &[VaultEntry] {
        &self.entries
    }

    /// Number of rows, decoys included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HoneyVaultError;
    use tempfile::TempDir;

    fn row(name: &str, secret: &str) -> VaultEntry {
        VaultEntry {
            name: name.into(),
            secret: secret.into(),
            encrypted_value: secret.as_bytes().to_vec(),
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let key = MasterKey::new([1u8; 32]);
        let store = VaultStore::open(dir.path(), "bank", &key).unwrap();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let key = MasterKey::new([1u8; 32]);

        let mut store = VaultStore::open(dir.path(), "bank", &key).unwrap();
        store.insert_batch(vec![row("login", "a"), row("login", "b")]);
        store.save().unwrap();

        let reopened = VaultStore::open(dir.path(), "bank", &key).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.vault_name(), "bank");
        assert!(reopened.find("login", "b").is_some());
        assert!(reopened.find("login", "c").is_none());
    }

    #[test]
    fn reopen_with_other_master_key_fails_integrity() {
        let dir = TempDir::new().unwrap();
        let mut store = VaultStore::open(dir.path(), "bank", &MasterKey::new([1u8; 32])).unwrap();
        store.insert_batch(vec![row("login", "a")]);
        store.save().unwrap();

        let result = VaultStore::open(dir.path(), "bank", &MasterKey::new([2u8; 32]));
        assert!(matches!(result, Err(HoneyVaultError::HmacMismatch)));
    }

    #[test]
    fn remove_group_only_touches_that_name() {
        let dir = TempDir::new().unwrap();
        let mut store = VaultStore::open(dir.path(), "bank", &MasterKey::new([1u8; 32])).unwrap();
        store.insert_batch(vec![row("login", "a"), row("pin", "1"), row("login", "b")]);

        assert_eq!(store.remove_group("login"), 2);
        assert!(!store.contains_name("login"));
        assert!(store.contains_name("pin"));
    }

    #[test]
    fn destroy_removes_file() {
        let dir = TempDir::new().unwrap();
        let mut store = VaultStore::open(dir.path(), "bank", &MasterKey::new([1u8; 32])).unwrap();
        store.insert_batch(vec![row("login", "a")]);
        store.save().unwrap();

        assert!(VaultStore::destroy(dir.path(), "bank").unwrap());
        assert!(!VaultStore::destroy(dir.path(), "bank").unwrap());
    }
}
