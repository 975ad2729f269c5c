pub mod cli;
pub mod config;
pub mod crypto;
pub mod directory;
pub mod errors;
pub mod oracle;
pub mod service;
pub mod vault;

pub use service::{AddedEntry, Completion, Retrieval, ServiceOptions, VaultService};
