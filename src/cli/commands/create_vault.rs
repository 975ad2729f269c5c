//! `honeyvault create-vault`: register a new vault under a master key.

use crate::cli::output;
use crate::cli::{open_service, prompt_new_master_key, Cli};
use crate::errors::Result;
use crate::vault::validate_vault_name;

/// Execute the `create-vault` command.
pub fn execute(cli: &Cli, vault: &str) -> Result<()> {
    // Catch a bad name before asking for a key.
    validate_vault_name(vault)?;

    let service = open_service(cli)?;
    let master_key = prompt_new_master_key(vault)?;
    service.create_vault(vault, &master_key)?;

    output::success(&format!("Created vault '{vault}'"));
    output::tip(&format!(
        "Add an entry: honeyvault add {vault} <NAME> <SECRET>"
    ));

    Ok(())
}
