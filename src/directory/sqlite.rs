//! Local key directory backed by SQLite.
//!
//! Stores records and alerts in `<data_dir>/directory/keys.db`.  The alert
//! insert shares the lookup's transaction: if it fails, the lookup fails,
//! so a decoy key is never handed out unrecorded.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, warn};

use super::{Alert, KeyDirectory, KeyLookup, KeyRecord};
use crate::errors::{HoneyVaultError, Result};

/// SQLite-backed key directory.
pub struct SqliteKeyDirectory {
    conn: Mutex<Connection>,
}

impl SqliteKeyDirectory {
    /// Open (or create) the directory database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }

        Self::init(conn)
    }

    /// In-memory directory, for tests and throwaway services.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                vault_name  TEXT NOT NULL,
                name        TEXT NOT NULL,
                secret      TEXT NOT NULL,
                key         TEXT NOT NULL,
                is_real     INTEGER NOT NULL,
                UNIQUE (vault_name, name, secret)
            );
            CREATE TABLE IF NOT EXISTS alerts (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                vault_name  TEXT NOT NULL,
                name        TEXT NOT NULL,
                secret      TEXT NOT NULL,
                timestamp   TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Records of one credential group, in insertion order.
    pub fn records_for(&self, vault_name: &str, name: &str) -> Result<Vec<KeyRecord>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT vault_name, name, secret, key, is_real FROM records
             WHERE vault_name = ?1 AND name = ?2
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![vault_name, name], |row| {
            Ok(KeyRecord {
                vault_name: row.get(0)?,
                name: row.get(1)?,
                secret: row.get(2)?,
                key: row.get(3)?,
                is_real: row.get(4)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Number of records held for a vault.
    pub fn record_count(&self, vault_name: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE vault_name = ?1",
            params![vault_name],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl KeyDirectory for SqliteKeyDirectory {
    fn lookup(&self, vault_name: &str, name: &str, secret: &str) -> Result<Option<KeyLookup>> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;

        let found = tx
            .query_row(
                "SELECT key, is_real FROM records
                 WHERE vault_name = ?1 AND name = ?2 AND secret = ?3",
                params![vault_name, name, secret],
                |row| {
                    Ok(KeyLookup {
                        key: row.get(0)?,
                        is_real: row.get(1)?,
                    })
                },
            )
            .optional()?;

        if let Some(ref hit) = found {
            if !hit.is_real {
                tx.execute(
                    "INSERT INTO alerts (vault_name, name, secret, timestamp)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        vault_name,
                        name,
                        secret,
                        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
                    ],
                )?;
                warn!(vault = vault_name, name, "decoy entry looked up, alert recorded");
            }
        }

        tx.commit()?;
        Ok(found)
    }

    fn insert_batch(&self, records: &[KeyRecord]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (vault_name, name, secret, key, is_real)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.vault_name,
                    record.name,
                    record.secret,
                    record.key,
                    record.is_real
                ])
                .map_err(|e| match e {
                    rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => {
                        HoneyVaultError::DirectoryError(format!(
                            "duplicate record for '{}' in vault '{}'",
                            record.name, record.vault_name
                        ))
                    }
                    other => other.into(),
                })?;
            }
        }
        tx.commit()?;
        debug!(count = records.len(), "key records inserted");
        Ok(())
    }

    fn delete_by_vault(&self, vault_name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = conn.execute(
            "DELETE FROM records WHERE vault_name = ?1",
            params![vault_name],
        )?;
        debug!(vault = vault_name, removed, "vault records deleted");
        Ok(())
    }

    fn delete_by_vault_and_name(&self, vault_name: &str, name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = conn.execute(
            "DELETE FROM records WHERE vault_name = ?1 AND name = ?2",
            params![vault_name, name],
        )?;
        debug!(vault = vault_name, name, removed, "group records deleted");
        Ok(())
    }

    fn list_alerts(&self) -> Result<Vec<Alert>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT vault_name, name, secret, timestamp FROM alerts
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let ts_str: String = row.get(3)?;
            let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));
            Ok(Alert {
                vault_name: row.get(0)?,
                name: row.get(1)?,
                secret: row.get(2)?,
                timestamp,
            })
        })?;

        let mut alerts = Vec::new();
        for row in rows {
            alerts.push(row?);
        }
        Ok(alerts)
    }
}
