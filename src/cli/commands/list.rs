//! `honeyvault list`: show the credential names in a vault.

use crate::cli::output;
use crate::cli::{open_service, prompt_master_key, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, vault: &str) -> Result<()> {
    let service = open_service(cli)?;
    let master_key = prompt_master_key(vault)?;

    let names = service.list_names(vault, &master_key)?;
    output::print_names_table(vault, &names);

    Ok(())
}
