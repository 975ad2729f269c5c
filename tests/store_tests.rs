//! Integration tests for the local stores: vault entry files, the master
//! registry and the SQLite key directory.

use std::fs;

use honeyvault::crypto::kdf::Argon2Params;
use honeyvault::directory::{KeyDirectory, KeyRecord, SqliteKeyDirectory};
use honeyvault::errors::HoneyVaultError;
use honeyvault::vault::{MasterRegistry, VaultEntry, VaultStore};
use tempfile::TempDir;

const FAST: Argon2Params = Argon2Params {
    memory_kib: 8192,
    iterations: 1,
    parallelism: 1,
};

fn entry(secret: &str) -> VaultEntry {
    VaultEntry {
        name: "login".into(),
        secret: secret.into(),
        encrypted_value: vec![1, 2, 3],
    }
}

fn registry_with_bank(dir: &TempDir) -> MasterRegistry {
    let registry = MasterRegistry::open(&dir.path().join("master.db")).unwrap();
    registry.register("bank", "m@ster", &[7u8; 32], &FAST).unwrap();
    registry
}

// ---------------------------------------------------------------------------
// Vault entry files
// ---------------------------------------------------------------------------

#[test]
fn entries_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let registry = registry_with_bank(&dir);
    let key = registry.authorize("bank", "m@ster").unwrap();
    let vaults = dir.path().join("vaults");

    let mut store = VaultStore::open(&vaults, "bank", &key).unwrap();
    assert!(store.is_empty());
    store.insert_batch(vec![entry("b"), entry("a")]);
    store.save().unwrap();

    let reopened = VaultStore::open(&vaults, "bank", &key).unwrap();
    assert_eq!(reopened.len(), 2);
    // Storage order is kept as written.
    assert_eq!(reopened.entries()[0].secret, "b");
    assert!(reopened.find("login", "a").is_some());
}

#[test]
fn tampered_entry_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let registry = registry_with_bank(&dir);
    let key = registry.authorize("bank", "m@ster").unwrap();
    let vaults = dir.path().join("vaults");

    let mut store = VaultStore::open(&vaults, "bank", &key).unwrap();
    store.insert_batch(vec![entry("p4ss")]);
    store.save().unwrap();

    let path = VaultStore::path_for(&vaults, "bank");
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    assert!(matches!(
        VaultStore::open(&vaults, "bank", &key),
        Err(HoneyVaultError::HmacMismatch)
    ));
}

#[test]
fn destroy_reports_whether_a_file_existed() {
    let dir = TempDir::new().unwrap();
    let registry = registry_with_bank(&dir);
    let key = registry.authorize("bank", "m@ster").unwrap();
    let vaults = dir.path().join("vaults");

    assert!(!VaultStore::destroy(&vaults, "bank").unwrap());

    let mut store = VaultStore::open(&vaults, "bank", &key).unwrap();
    store.insert_batch(vec![entry("p4ss")]);
    store.save().unwrap();

    assert!(VaultStore::destroy(&vaults, "bank").unwrap());
    assert!(!VaultStore::path_for(&vaults, "bank").exists());
}

// ---------------------------------------------------------------------------
// Master registry
// ---------------------------------------------------------------------------

#[test]
fn registry_survives_reopen_without_storing_the_key() {
    let dir = TempDir::new().unwrap();
    drop(registry_with_bank(&dir));

    let raw = fs::read(dir.path().join("master.db")).unwrap();
    assert!(!raw.windows(6).any(|w| w == b"m@ster"));

    let registry = MasterRegistry::open(&dir.path().join("master.db")).unwrap();
    assert!(registry.authorize("bank", "m@ster").is_ok());
    assert!(matches!(
        registry.authorize("bank", "nope"),
        Err(HoneyVaultError::Unauthorized)
    ));
    assert_eq!(registry.list().unwrap()[0].vault_name, "bank");
}

// ---------------------------------------------------------------------------
// SQLite key directory
// ---------------------------------------------------------------------------

#[test]
fn directory_records_and_alerts_persist() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("directory").join("keys.db");

    {
        let directory = SqliteKeyDirectory::open(&path).unwrap();
        directory
            .insert_batch(&[
                KeyRecord {
                    vault_name: "bank".into(),
                    name: "login".into(),
                    secret: "p4ss".into(),
                    key: "r".repeat(20),
                    is_real: true,
                },
                KeyRecord {
                    vault_name: "bank".into(),
                    name: "login".into(),
                    secret: "p4ss1".into(),
                    key: "d".repeat(20),
                    is_real: false,
                },
            ])
            .unwrap();
        directory.lookup("bank", "login", "p4ss1").unwrap();
    }

    let directory = SqliteKeyDirectory::open(&path).unwrap();
    assert_eq!(directory.record_count("bank").unwrap(), 2);
    let alerts = directory.list_alerts().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].secret, "p4ss1");
}
