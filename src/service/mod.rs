//! The vault service: orchestrates the master registry, the per-vault entry
//! stores, the key directory and the decoy oracle.
//!
//! The vault store and the key directory are separate stores with no shared
//! transaction.  Writes go to the vault store first and the directory
//! second; a failed second phase is reported, never rolled back:
//!
//! - `add_entry` returns `PartialFailure` when the directory push fails.
//! - `delete_entry` / `delete_vault` return `Completion::DirectoryOutOfSync`
//!   when the directory delete fails after the local delete.
//! - `delete_entry` clears rows left behind by a partial add: when the
//!   directory has no record for `(name, secret)` but the vault store has
//!   that exact row, the group is removed and `Completion::LocalOnly` is
//!   returned, after which the name can be added again.
//!
//! Mutating operations on one vault are serialized by a per-vault lock;
//! different vaults proceed independently.

pub mod batch;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{DecoyResponse, OracleKind, Settings};
use crate::crypto::encryption::decrypt_with_key;
use crate::crypto::kdf::{generate_salt, Argon2Params};
use crate::crypto::random::ENTRY_KEY_LEN;
use crate::directory::{Alert, HttpKeyDirectory, KeyDirectory, SqliteKeyDirectory};
use crate::errors::{HoneyVaultError, Result};
use crate::oracle::{DecoyOracle, HttpDecoyOracle, RandomDecoyOracle};
use crate::vault::{validate_vault_name, MasterRegistry, VaultStore, VaultSummary};

/// Tunables the service needs at run time.
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    pub key_length: usize,
    pub decoy_response: DecoyResponse,
    pub argon2_params: Argon2Params,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            key_length: ENTRY_KEY_LEN,
            decoy_response: DecoyResponse::Respond,
            argon2_params: Argon2Params::default(),
        }
    }
}

impl From<&Settings> for ServiceOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            key_length: settings.key_length,
            decoy_response: settings.decoy_response,
            argon2_params: settings.argon2_params(),
        }
    }
}

/// Outcome of a successful `add_entry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedEntry {
    /// Decoys stored alongside the real entry.
    pub decoys: usize,
}

/// What `get_entry` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// The real value.
    Real(String),
    /// The secret belongs to a decoy; an alert has been recorded.
    /// `plaintext` is the decoy's filler value unless withheld by policy.
    Decoy { plaintext: Option<String> },
}

impl Retrieval {
    /// The real value, or `DecoyAccessed`.
    pub fn into_real(self) -> Result<String> {
        match self {
            Self::Real(value) => Ok(value),
            Self::Decoy { .. } => Err(HoneyVaultError::DecoyAccessed),
        }
    }

    pub fn is_decoy(&self) -> bool {
        matches!(self, Self::Decoy { .. })
    }
}

/// Outcome of a delete whose local half succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Both stores updated.
    Complete,
    /// The key directory delete failed; its records are now orphaned.
    DirectoryOutOfSync(String),
    /// The key directory held no records for the entry (an earlier add
    /// stopped after its local write); only the local rows were removed.
    LocalOnly,
}

/// The orchestrating service.
pub struct VaultService {
    registry: MasterRegistry,
    vaults_dir: PathBuf,
    directory: Arc<dyn KeyDirectory>,
    oracle: Arc<dyn DecoyOracle>,
    rng: Mutex<StdRng>,
    vault_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    options: ServiceOptions,
}

impl VaultService {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Assemble a service from its parts.
    ///
    /// `rng` drives entry keys, decoy fillers, salts and the storage
    /// shuffle; seed it to make those reproducible.
    pub fn new(
        registry: MasterRegistry,
        vaults_dir: PathBuf,
        directory: Arc<dyn KeyDirectory>,
        oracle: Arc<dyn DecoyOracle>,
        rng: StdRng,
        options: ServiceOptions,
    ) -> Self {
        Self {
            registry,
            vaults_dir,
            directory,
            oracle,
            rng: Mutex::new(rng),
            vault_locks: Mutex::new(HashMap::new()),
            options,
        }
    }

    /// Open the stores under `data_dir` and wire the configured backends.
    pub fn open(data_dir: &Path, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        std::fs::create_dir_all(data_dir)?;

        let registry = MasterRegistry::open(&Settings::registry_path(data_dir))?;

        let directory: Arc<dyn KeyDirectory> = match settings.directory_url {
            Some(ref url) => {
                debug!(%url, "using remote key directory");
                Arc::new(HttpKeyDirectory::new(url, settings.directory_timeout()))
            }
            None => Arc::new(SqliteKeyDirectory::open(&Settings::directory_path(data_dir))?),
        };

        let oracle: Arc<dyn DecoyOracle> = match settings.oracle {
            OracleKind::Http => Arc::new(HttpDecoyOracle::new(
                &settings.oracle_url,
                settings.oracle_timeout(),
            )),
            OracleKind::Random => Arc::new(RandomDecoyOracle::new(
                settings.random_decoy_count,
                StdRng::from_os_rng(),
            )),
        };

        Ok(Self::new(
            registry,
            Settings::vaults_dir(data_dir),
            directory,
            oracle,
            StdRng::from_os_rng(),
            ServiceOptions::from(settings),
        ))
    }

    // ------------------------------------------------------------------
    // Vault lifecycle
    // ------------------------------------------------------------------

    /// Register a new vault.
    ///
    /// Leftovers of an earlier vault with the same name (an entry file or
    /// directory records from an interrupted delete) are cleared.
    pub fn create_vault(&self, vault_name: &str, master_key: &str) -> Result<()> {
        validate_vault_name(vault_name)?;
        let lock = self.vault_lock(vault_name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let salt = generate_salt(&mut *self.rng());
        self.registry
            .register(vault_name, master_key, &salt, &self.options.argon2_params)?;

        if VaultStore::destroy(&self.vaults_dir, vault_name)? {
            warn!(vault = vault_name, "removed stale entry file");
        }
        if let Err(e) = self.directory.delete_by_vault(vault_name) {
            warn!(vault = vault_name, error = %e, "could not clear stale key records");
        }

        info!(vault = vault_name, "vault created");
        Ok(())
    }

    /// Delete a vault: entries first, then directory records, then the
    /// registration.
    pub fn delete_vault(&self, vault_name: &str, master_key: &str) -> Result<Completion> {
        let lock = self.vault_lock(vault_name);
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.registry.authorize(vault_name, master_key)?;

        VaultStore::destroy(&self.vaults_dir, vault_name)?;

        let completion = match self.directory.delete_by_vault(vault_name) {
            Ok(()) => Completion::Complete,
            Err(e) => {
                warn!(vault = vault_name, error = %e, "key directory delete failed");
                Completion::DirectoryOutOfSync(e.to_string())
            }
        };

        self.registry.remove(vault_name)?;
        drop(guard);
        self.vault_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(vault_name);

        info!(vault = vault_name, "vault deleted");
        Ok(completion)
    }

    /// All registered vaults.
    pub fn list_vaults(&self) -> Result<Vec<VaultSummary>> {
        self.registry.list()
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Store `value` under `(name, secret)` together with oracle-suggested
    /// decoys.
    ///
    /// Nothing is written unless authorization, validation and the oracle
    /// call all succeed.
    pub fn add_entry(
        &self,
        vault_name: &str,
        master_key: &str,
        name: &str,
        secret: &str,
        value: &str,
    ) -> Result<AddedEntry> {
        let lock = self.vault_lock(vault_name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let key = self.registry.authorize(vault_name, master_key)?;
        batch::validate_entry(name, secret)?;

        let mut store = VaultStore::open(&self.vaults_dir, vault_name, &key)?;
        if store.contains_name(name) {
            return Err(HoneyVaultError::EntryExists(name.to_string()));
        }

        let candidates = self
            .oracle
            .suggest_decoys(name, secret)
            .map_err(|e| match e {
                HoneyVaultError::OracleUnavailable(_) => e,
                other => HoneyVaultError::OracleUnavailable(other.to_string()),
            })?;
        let offered = candidates.len();
        let decoys = batch::usable_candidates(candidates, secret);
        if decoys.len() < offered {
            debug!(offered, kept = decoys.len(), "dropped unusable decoy candidates");
        }

        let batch = batch::build(
            &mut *self.rng(),
            vault_name,
            name,
            secret,
            value,
            &decoys,
            self.options.key_length,
        )?;
        let added = AddedEntry {
            decoys: batch.decoy_count(),
        };

        // Phase 1: vault store.
        store.insert_batch(batch.local);
        store.save()?;
        debug!(vault = vault_name, name, rows = store.len(), "entry rows written");

        // Phase 2: key directory.
        if let Err(e) = self.directory.insert_batch(&batch.directory) {
            warn!(vault = vault_name, name, error = %e, "key directory push failed after local write");
            return Err(HoneyVaultError::PartialFailure(e.to_string()));
        }

        info!(vault = vault_name, name, decoys = added.decoys, "entry added");
        Ok(added)
    }

    /// Fetch and decrypt the entry answering to `(name, secret)`.
    ///
    /// A decoy secret yields `Retrieval::Decoy`; the key directory has
    /// recorded the alert by the time this returns.
    pub fn get_entry(
        &self,
        vault_name: &str,
        master_key: &str,
        name: &str,
        secret: &str,
    ) -> Result<Retrieval> {
        let key = self.registry.authorize(vault_name, master_key)?;

        let hit = self
            .directory
            .lookup(vault_name, name, secret)?
            .ok_or_else(|| HoneyVaultError::EntryNotFound {
                name: name.to_string(),
            })?;

        if !hit.is_real {
            warn!(vault = vault_name, name, "decoy entry accessed");
            let plaintext = match self.options.decoy_response {
                DecoyResponse::Withhold => None,
                DecoyResponse::Respond => {
                    let store = VaultStore::open(&self.vaults_dir, vault_name, &key)?;
                    store
                        .find(name, secret)
                        .and_then(|row| decrypt_with_key(&hit.key, &row.encrypted_value).ok())
                }
            };
            return Ok(Retrieval::Decoy { plaintext });
        }

        let store = VaultStore::open(&self.vaults_dir, vault_name, &key)?;
        let row = store.find(name, secret).ok_or_else(|| {
            warn!(vault = vault_name, name, "key record has no matching entry row");
            HoneyVaultError::EntryNotFound {
                name: name.to_string(),
            }
        })?;

        let value = decrypt_with_key(&hit.key, &row.encrypted_value)?;
        debug!(vault = vault_name, name, "entry retrieved");
        Ok(Retrieval::Real(value))
    }

    /// Delete a real entry together with its decoys.
    ///
    /// A decoy secret is refused with `CannotDeleteDecoy`; the lookup used
    /// to classify it records an alert like any other decoy access.
    pub fn delete_entry(
        &self,
        vault_name: &str,
        master_key: &str,
        name: &str,
        secret: &str,
    ) -> Result<Completion> {
        let lock = self.vault_lock(vault_name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let key = self.registry.authorize(vault_name, master_key)?;

        let hit = self.directory.lookup(vault_name, name, secret)?;
        let mut store = VaultStore::open(&self.vaults_dir, vault_name, &key)?;

        let hit = match hit {
            Some(hit) => hit,
            None if store.find(name, secret).is_some() => {
                return self.remove_unindexed_group(vault_name, name, &mut store);
            }
            None => {
                return Err(HoneyVaultError::EntryNotFound {
                    name: name.to_string(),
                })
            }
        };
        if !hit.is_real {
            warn!(vault = vault_name, name, "refused to delete decoy entry");
            return Err(HoneyVaultError::CannotDeleteDecoy);
        }

        let removed = store.remove_group(name);
        if removed > 0 {
            store.save()?;
        }
        debug!(vault = vault_name, name, removed, "entry rows removed");

        let completion = match self.directory.delete_by_vault_and_name(vault_name, name) {
            Ok(()) => Completion::Complete,
            Err(e) => {
                warn!(vault = vault_name, name, error = %e, "key directory delete failed");
                Completion::DirectoryOutOfSync(e.to_string())
            }
        };

        info!(vault = vault_name, name, "entry deleted");
        Ok(completion)
    }

    // ------------------------------------------------------------------
    // Alerts and inspection
    // ------------------------------------------------------------------

    /// Every alert, newest first.
    pub fn list_alerts(&self) -> Result<Vec<Alert>> {
        self.directory.list_alerts()
    }

    /// Alerts raised for one vault, newest first.
    pub fn list_alerts_for(&self, vault_name: &str) -> Result<Vec<Alert>> {
        Ok(self
            .list_alerts()?
            .into_iter()
            .filter(|a| a.vault_name == vault_name)
            .collect())
    }

    /// Credential names in a vault with their row counts (decoys included),
    /// sorted by name.
    pub fn list_names(&self, vault_name: &str, master_key: &str) -> Result<Vec<(String, usize)>> {
        let key = self.registry.authorize(vault_name, master_key)?;
        let store = VaultStore::open(&self.vaults_dir, vault_name, &key)?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in store.entries() {
            *counts.entry(row.name.clone()).or_default() += 1;
        }
        let mut names: Vec<_> = counts.into_iter().collect();
        names.sort();
        Ok(names)
    }

    /// Directory holding the per-vault entry files.
    pub fn vaults_dir(&self) -> &Path {
        &self.vaults_dir
    }

    /// The master registry, for inspection.
    pub fn registry(&self) -> &MasterRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Drop a group whose key records never reached the directory.
    fn remove_unindexed_group(
        &self,
        vault_name: &str,
        name: &str,
        store: &mut VaultStore,
    ) -> Result<Completion> {
        let removed = store.remove_group(name);
        store.save()?;
        warn!(vault = vault_name, name, removed, "removed entry rows with no key records");

        // Stray records under the name would block a later add.
        if let Err(e) = self.directory.delete_by_vault_and_name(vault_name, name) {
            warn!(vault = vault_name, name, error = %e, "key directory delete failed");
            return Ok(Completion::DirectoryOutOfSync(e.to_string()));
        }
        Ok(Completion::LocalOnly)
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn vault_lock(&self, vault_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .vault_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(vault_name.to_string()).or_default())
    }
}
