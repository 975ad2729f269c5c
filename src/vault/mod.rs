//! Vault module: the local side of the split store.
//!
//! This module provides:
//! - `VaultEntry`, the schema shared by real and decoy rows (`entry`)
//! - Binary entry-file format with HMAC integrity (`format`)
//! - `VaultStore`, one vault's entry collection (`store`)
//! - `MasterRegistry`, the vault name -> master key verifier table (`registry`)

pub mod entry;
pub mod format;
pub mod registry;
pub mod store;

// Re-export the most commonly used items.
pub use entry::VaultEntry;
pub use format::VaultHeader;
pub use registry::{validate_vault_name, MasterRegistry, VaultSummary};
pub use store::VaultStore;
