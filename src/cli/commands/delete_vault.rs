//! `honeyvault delete-vault`: remove a vault and everything in it.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_service, prompt_master_key, Cli};
use crate::errors::{HoneyVaultError, Result};
use crate::service::Completion;

/// Execute the `delete-vault` command.
pub fn execute(cli: &Cli, vault: &str, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete vault '{vault}' and all of its entries? This cannot be undone."
            ))
            .default(false)
            .interact()
            .map_err(|e| HoneyVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let service = open_service(cli)?;
    let master_key = prompt_master_key(vault)?;

    let completion = service.delete_vault(vault, &master_key)?;
    output::success(&format!("Deleted vault '{vault}'"));
    if let Completion::DirectoryOutOfSync(reason) = completion {
        output::warning(&format!(
            "Key directory was not updated ({reason}); its records for '{vault}' are orphaned."
        ));
    }

    Ok(())
}
