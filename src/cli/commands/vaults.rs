//! `honeyvault vaults`: list registered vaults.

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::errors::Result;

/// Execute the `vaults` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let service = open_service(cli)?;
    output::print_vaults_table(&service.list_vaults()?);
    Ok(())
}
