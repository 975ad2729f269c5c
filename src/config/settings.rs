use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::random::ENTRY_KEY_LEN;
use crate::errors::{HoneyVaultError, Result};

/// Which decoy source `add` consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Remote suggestion service at `oracle_url`.
    Http,
    /// Local random strings; no network needed.
    Random,
}

/// What `get` hands back when the secret belongs to a decoy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoyResponse {
    /// Decrypt and return the decoy's filler value, as for a real entry.
    Respond,
    /// Return nothing beyond the decoy signal.
    Withhold,
}

/// Service configuration, loaded from `<data_dir>/honeyvault.toml`.
///
/// Every field has a sensible default so HoneyVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Decoy source used by `add`.
    #[serde(default = "default_oracle")]
    pub oracle: OracleKind,

    /// Base URL of the decoy suggestion service.
    #[serde(default = "default_oracle_url")]
    pub oracle_url: String,

    /// Upper bound on one oracle request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub oracle_timeout_secs: u64,

    /// Candidates produced per entry by the random oracle.
    #[serde(default = "default_random_decoy_count")]
    pub random_decoy_count: usize,

    /// Base URL of a remote key directory.  When unset, a local SQLite
    /// directory under the data directory is used.
    #[serde(default)]
    pub directory_url: Option<String>,

    /// Upper bound on one key directory request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub directory_timeout_secs: u64,

    /// Length of generated entry keys (at least 20).
    #[serde(default = "default_key_length")]
    pub key_length: usize,

    /// Behaviour of `get` on a decoy.
    #[serde(default = "default_decoy_response")]
    pub decoy_response: DecoyResponse,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_oracle() -> OracleKind {
    OracleKind::Http
}

fn default_oracle_url() -> String {
    "http://localhost:44518/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_random_decoy_count() -> usize {
    crate::oracle::random::DEFAULT_DECOY_COUNT
}

fn default_key_length() -> usize {
    ENTRY_KEY_LEN
}

fn default_decoy_response() -> DecoyResponse {
    DecoyResponse::Respond
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            oracle: default_oracle(),
            oracle_url: default_oracle_url(),
            oracle_timeout_secs: default_timeout_secs(),
            random_decoy_count: default_random_decoy_count(),
            directory_url: None,
            directory_timeout_secs: default_timeout_secs(),
            key_length: default_key_length(),
            decoy_response: default_decoy_response(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file looked up in the data directory.
    pub const FILE_NAME: &'static str = "honeyvault.toml";

    /// Load settings from `<data_dir>/honeyvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            HoneyVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.key_length < ENTRY_KEY_LEN {
            return Err(HoneyVaultError::ConfigError(format!(
                "key_length must be at least {ENTRY_KEY_LEN} (got {})",
                self.key_length
            )));
        }
        if self.oracle_timeout_secs == 0 || self.directory_timeout_secs == 0 {
            return Err(HoneyVaultError::ConfigError(
                "timeouts must be at least 1 second".into(),
            ));
        }
        Ok(())
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> crate::crypto::kdf::Argon2Params {
        crate::crypto::kdf::Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory_timeout_secs)
    }

    /// Example: `data_dir/master.db`
    pub fn registry_path(data_dir: &Path) -> PathBuf {
        data_dir.join("master.db")
    }

    /// Example: `data_dir/vaults`
    pub fn vaults_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("vaults")
    }

    /// Example: `data_dir/directory/keys.db`
    pub fn directory_path(data_dir: &Path) -> PathBuf {
        data_dir.join("directory").join("keys.db")
    }
}

// ── Tests ────────────────────────────────────────────────────────────
