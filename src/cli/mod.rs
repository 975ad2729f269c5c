//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{OracleKind, Settings};
use crate::errors::{HoneyVaultError, Result};
use crate::service::VaultService;

/// Environment variable consulted for the master key before prompting.
pub const MASTER_KEY_ENV: &str = "HONEYVAULT_MASTER_KEY";

/// HoneyVault CLI: secret vault with decoy entries and access alerts.
#[derive(Parser)]
#[command(
    name = "honeyvault",
    about = "Secret vault that hides every entry among decoys and alerts on decoy access",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the registry, vault files and key directory
    #[arg(
        long,
        default_value = ".honeyvault",
        env = "HONEYVAULT_DATA_DIR",
        global = true
    )]
    pub data_dir: String,

    /// Settings file (default: <data-dir>/honeyvault.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Decoy source, overriding the settings file
    #[arg(long, value_enum, global = true)]
    pub oracle: Option<OracleKind>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Register a new vault under a master key
    CreateVault {
        /// Vault name (letters and digits)
        vault: String,
    },

    /// Store a value together with generated decoys
    Add {
        /// Vault name
        vault: String,
        /// Credential name (e.g. login)
        name: String,
        /// Secret that unlocks the value
        secret: String,
        /// Value to protect (omit for interactive prompt)
        value: Option<String>,
    },

    /// Retrieve the value stored under a name and secret
    Get {
        /// Vault name
        vault: String,
        /// Credential name
        name: String,
        /// Secret
        secret: String,
    },

    /// Delete an entry and all of its decoys
    Delete {
        /// Vault name
        vault: String,
        /// Credential name
        name: String,
        /// The real secret of the entry
        secret: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a vault with every entry in it
    DeleteVault {
        /// Vault name
        vault: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List credential names stored in a vault
    List {
        /// Vault name
        vault: String,
    },

    /// Show decoy access alerts
    Alerts {
        /// Only alerts for this vault
        #[arg(long)]
        vault: Option<String>,
        /// Number of alerts to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// List registered vaults
    Vaults,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// The data directory, resolved against the working directory.
pub fn data_dir(cli: &Cli) -> Result<PathBuf> {
    let path = Path::new(&cli.data_dir);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Settings from `--config` or the data directory, with CLI overrides applied.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match cli.config {
        Some(ref path) => Settings::load_from(Path::new(path))?,
        None => Settings::load(&data_dir(cli)?)?,
    };
    if let Some(oracle) = cli.oracle {
        settings.oracle = oracle;
    }
    Ok(settings)
}

/// Open the vault service for this invocation.
pub fn open_service(cli: &Cli) -> Result<VaultService> {
    let settings = load_settings(cli)?;
    VaultService::open(&data_dir(cli)?, &settings)
}

/// Get the master key of `vault`, trying in order:
/// 1. `HONEYVAULT_MASTER_KEY` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the key is wiped from memory on drop.
pub fn prompt_master_key(vault: &str) -> Result<Zeroizing<String>> {
    if let Some(key) = master_key_from_env() {
        return Ok(key);
    }

    let key = dialoguer::Password::new()
        .with_prompt(format!("Master key for '{vault}'"))
        .interact()
        .map_err(|e| HoneyVaultError::CommandFailed(format!("master key prompt: {e}")))?;
    Ok(Zeroizing::new(key))
}

/// Prompt for a new master key with confirmation (used by `create-vault`).
///
/// Also respects `HONEYVAULT_MASTER_KEY` for scripted usage.
pub fn prompt_new_master_key(vault: &str) -> Result<Zeroizing<String>> {
    if let Some(key) = master_key_from_env() {
        return Ok(key);
    }

    let key = dialoguer::Password::new()
        .with_prompt(format!("Choose a master key for '{vault}'"))
        .with_confirmation("Confirm master key", "Master keys do not match, try again")
        .interact()
        .map_err(|e| HoneyVaultError::CommandFailed(format!("master key prompt: {e}")))?;
    Ok(Zeroizing::new(key))
}

fn master_key_from_env() -> Option<Zeroizing<String>> {
    std::env::var(MASTER_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .map(Zeroizing::new)
}
