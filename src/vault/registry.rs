//! Master registry, one registration per vault.
//!
//! Stored in SQLite at `<data_dir>/master.db`.  A registration never holds
//! the master key itself: it keeps the Argon2id salt and parameters plus a
//! verifier derived from the stretched key.  Authorization recomputes the
//! verifier and compares in constant time.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::crypto::kdf::{derive_master_key_with_params, Argon2Params};
use crate::crypto::keys::MasterKey;
use crate::errors::{HoneyVaultError, Result};

/// Listing row for `vaults`.
#[derive(Debug, Clone)]
pub struct VaultSummary {
    pub vault_name: String,
    pub created_at: DateTime<Utc>,
}

struct Registration {
    salt: Vec<u8>,
    verifier: Vec<u8>,
    params: Argon2Params,
}

/// SQLite-backed registry of vault names and master-key verifiers.
pub struct MasterRegistry {
    conn: Mutex<Connection>,
}

impl MasterRegistry {
    /// Open (or create) the registry database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Owner-only permissions on the registry.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }

        Self::init(conn)
    }

    /// In-memory registry, for tests and throwaway services.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS vaults (
                vault_name  TEXT PRIMARY KEY,
                salt        BLOB NOT NULL,
                verifier    BLOB NOT NULL,
                memory_kib  INTEGER NOT NULL,
                iterations  INTEGER NOT NULL,
                parallelism INTEGER NOT NULL,
                created_at  TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Register a new vault.
    ///
    /// Fails with `InvalidVaultName` or `VaultAlreadyExists`; nothing is
    /// written in either case.
    pub fn register(
        &self,
        vault_name: &str,
        master_key: &str,
        salt: &[u8],
        argon2_params: &Argon2Params,
    ) -> Result<()> {
        validate_vault_name(vault_name)?;
        if master_key.is_empty() {
            return Err(HoneyVaultError::InvalidEntry(
                "master key cannot be empty".into(),
            ));
        }
        if self.contains(vault_name)? {
            return Err(HoneyVaultError::VaultAlreadyExists(vault_name.to_string()));
        }

        let mut stretched = derive_master_key_with_params(master_key.as_bytes(), salt, argon2_params)?;
        let key = MasterKey::new(stretched);
        stretched.zeroize();
        let verifier = key.derive_verifier()?;

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let inserted = conn.execute(
            "INSERT INTO vaults (vault_name, salt, verifier, memory_kib, iterations, parallelism, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                vault_name,
                salt,
                verifier.as_slice(),
                argon2_params.memory_kib,
                argon2_params.iterations,
                argon2_params.parallelism,
                Utc::now().to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                info!(vault = vault_name, "vault registered");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(HoneyVaultError::VaultAlreadyExists(vault_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check `master_key` against the vault's registration.
    ///
    /// Returns the stretched key on success.  A missing vault and a wrong
    /// key are both `Unauthorized`.
    pub fn authorize(&self, vault_name: &str, master_key: &str) -> Result<MasterKey> {
        let registration = self
            .fetch(vault_name)?
            .ok_or(HoneyVaultError::Unauthorized)?;

        let mut stretched = derive_master_key_with_params(
            master_key.as_bytes(),
            &registration.salt,
            &registration.params,
        )?;
        let key = MasterKey::new(stretched);
        stretched.zeroize();

        if key.matches_verifier(&registration.verifier)? {
            Ok(key)
        } else {
            debug!(vault = vault_name, "master key mismatch");
            Err(HoneyVaultError::Unauthorized)
        }
    }

    /// Returns `true` if `vault_name` is registered.
    pub fn contains(&self, vault_name: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM vaults WHERE vault_name = ?1",
                params![vault_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Remove a registration.  Returns `false` if it was already gone.
    pub fn remove(&self, vault_name: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = conn.execute("DELETE FROM vaults WHERE vault_name = ?1", params![vault_name])?;
        Ok(removed > 0)
    }

    /// All registered vaults, sorted by name.
    pub fn list(&self) -> Result<Vec<VaultSummary>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt =
            conn.prepare("SELECT vault_name, created_at FROM vaults ORDER BY vault_name")?;

        let rows = stmt.query_map([], |row| {
            let ts_str: String = row.get(1)?;
            let created_at = DateTime::parse_from_rfc3339(&ts_str)
                .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));
            Ok(VaultSummary {
                vault_name: row.get(0)?,
                created_at,
            })
        })?;

        let mut vaults = Vec::new();
        for row in rows {
            vaults.push(row?);
        }
        Ok(vaults)
    }

    fn fetch(&self, vault_name: &str) -> Result<Option<Registration>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let registration = conn
            .query_row(
                "SELECT salt, verifier, memory_kib, iterations, parallelism
                 FROM vaults WHERE vault_name = ?1",
                params![vault_name],
                |row| {
                    Ok(Registration {
                        salt: row.get(0)?,
                        verifier: row.get(1)?,
                        params: Argon2Params {
                            memory_kib: row.get(2)?,
                            iterations: row.get(3)?,
                            parallelism: row.get(4)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(registration)
    }
}

/// Maximum vault name length; names become file names.
const MAX_VAULT_NAME_LEN: usize = 128;

/// Validate a vault name: one or more ASCII letters or digits.
pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.len() > MAX_VAULT_NAME_LEN
        || !name.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(HoneyVaultError::InvalidVaultName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FAST: Argon2Params = Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn valid_vault_names() {
        assert!(validate_vault_name("bank").is_ok());
        assert!(validate_vault_name("Bank2").is_ok());
        assert!(validate_vault_name("0").is_ok());
    }

    #[test]
    fn rejects_invalid_vault_names() {
        for name in ["", "my-vault", "my vault", "a/b", "vault_1", "caf\u{e9}"] {
            assert!(
                matches!(validate_vault_name(name), Err(HoneyVaultError::InvalidVaultName(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(validate_vault_name(&"a".repeat(129)).is_err());
    }

    #[test]
    fn register_and_authorize() {
        let registry = MasterRegistry::open_in_memory().unwrap();
        registry.register("bank", "m1", &[5u8; 32], &FAST).unwrap();

        assert!(registry.authorize("bank", "m1").is_ok());
        assert!(matches!(
            registry.authorize("bank", "m2"),
            Err(HoneyVaultError::Unauthorized)
        ));
        assert!(matches!(
            registry.authorize("nobank", "m1"),
            Err(HoneyVaultError::Unauthorized)
        ));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let registry = MasterRegistry::open_in_memory().unwrap();
        registry.register("bank", "m1", &[5u8; 32], &FAST).unwrap();

        assert!(matches!(
            registry.register("bank", "other", &[6u8; 32], &FAST),
            Err(HoneyVaultError::VaultAlreadyExists(_))
        ));
        // The first key still works.
        assert!(registry.authorize("bank", "m1").is_ok());
    }

    #[test]
    fn remove_and_list() {
        let registry = MasterRegistry::open_in_memory().unwrap();
        registry.register("zeta", "m", &[1u8; 32], &FAST).unwrap();
        registry.register("alpha", "m", &[2u8; 32], &FAST).unwrap();

        let names: Vec<_> = registry.list().unwrap().into_iter().map(|v| v.vault_name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        assert!(registry.remove("zeta").unwrap());
        assert!(!registry.remove("zeta").unwrap());
        assert!(!registry.contains("zeta").unwrap());
    }

    #[test]
    fn master_key_is_not_stored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master.db");
        let registry = MasterRegistry::open(&path).unwrap();
        registry
            .register("bank", "CorrectHorseBatteryStaple", &[5u8; 32], &FAST)
            .unwrap();
        drop(registry);

        let bytes = std::fs::read(&path).unwrap();
        let needle = b"CorrectHorseBatteryStaple";
        assert!(!bytes.windows(needle.len()).any(|w| w == needle));
    }
}
