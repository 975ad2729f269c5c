//! `honeyvault delete`: remove an entry and its decoys.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_service, prompt_master_key, Cli};
use crate::errors::{HoneyVaultError, Result};
use crate::service::Completion;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, vault: &str, name: &str, secret: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry '{name}' from vault '{vault}'?"))
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

    match service.delete_entry(vault, &master_key, name, secret)? {
        Completion::Complete => output::success(&format!("Deleted entry '{name}'")),
        Completion::LocalOnly => {
            output::success(&format!("Deleted entry '{name}' from vault '{vault}'"));
            output::info("The key directory had no records for it; the name can be added again.");
        }
        Completion::DirectoryOutOfSync(reason) => {
            output::success(&format!("Deleted entry '{name}' from vault '{vault}'"));
            output::warning(&format!(
                "Key directory was not updated ({reason}); its records for '{name}' are orphaned."
            ));
        }
    }

    Ok(())
}
