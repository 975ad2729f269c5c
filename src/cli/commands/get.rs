//! `honeyvault get`: retrieve and print a single value.

use crate::cli::{open_service, prompt_master_key, Cli};
use crate::errors::{HoneyVaultError, Result};
use crate::service::Retrieval;

/// Execute the `get` command.
///
/// A decoy whose filler is released prints exactly like a real value.
pub fn execute(cli: &Cli, vault: &str, name: &str, secret: &str) -> Result<()> {
    let service = open_service(cli)?;
    let master_key = prompt_master_key(vault)?;

    match service.get_entry(vault, &master_key, name, secret)? {
        Retrieval::Real(value)
        | Retrieval::Decoy {
            plaintext: Some(value),
        } => {
            println!("{value}");
            Ok(())
        }
        Retrieval::Decoy { plaintext: None } => Err(HoneyVaultError::DecoyAccessed),
    }
}
