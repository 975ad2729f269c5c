//! Key directory: the trust boundary that knows which entries are real.
//!
//! The directory maps `(vault_name, name, secret)` to the entry's
//! decryption key and its authenticity flag, and keeps the append-only
//! alert log.  A lookup that resolves to a decoy records an alert inside
//! the same call, so no client can read a decoy key without leaving a
//! trace.
//!
//! Two backends implement [`KeyDirectory`]:
//! - [`SqliteKeyDirectory`], a local SQLite database.
//! - [`HttpKeyDirectory`], a client for a remote directory service.

pub mod http;
pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use http::HttpKeyDirectory;
pub use sqlite::SqliteKeyDirectory;

/// One directory row, paired one-to-one with a vault entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub vault_name: String,
    pub name: String,
    pub secret: String,
    pub key: String,
    #[serde(with = "flag")]
    pub is_real: bool,
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLookup {
    pub key: String,
    pub is_real: bool,
}

/// A recorded decoy lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub vault_name: String,
    pub name: String,
    pub secret: String,
    pub timestamp: DateTime<Utc>,
}

/// Operations the vault service needs from a key directory.
pub trait KeyDirectory: Send + Sync {
    /// Fetch the key bound to `(vault_name, name, secret)`.
    ///
    /// When the record is a decoy, an [`Alert`] is appended before this
    /// returns.  `Ok(None)` means no such record.
    fn lookup(&self, vault_name: &str, name: &str, secret: &str) -> Result<Option<KeyLookup>>;

    /// Insert a batch of records as one unit.
    fn insert_batch(&self, records: &[KeyRecord]) -> Result<()>;

    /// Remove every record belonging to a vault.
    fn delete_by_vault(&self, vault_name: &str) -> Result<()>;

    /// Remove every record of one credential group in a vault.
    fn delete_by_vault_and_name(&self, vault_name: &str, name: &str) -> Result<()>;

    /// All alerts, newest first.
    fn list_alerts(&self) -> Result<Vec<Alert>>;
}

/// `is_real` travels as `1`/`0` on the wire; booleans are accepted too.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
    }
}
