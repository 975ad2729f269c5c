//! `honeyvault add`: store a value behind a secret, hidden among decoys.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_service, prompt_master_key, Cli};
use crate::errors::{HoneyVaultError, Result};

/// Execute the `add` command.
pub fn execute(cli: &Cli, vault: &str, name: &str, secret: &str, value: Option<&str>) -> Result<()> {
    // Determine the value from one of three sources.
    let entry_value = Zeroizing::new(if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line, it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input.
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end().to_string()
    } else {
        // Source 3: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt(format!("Enter value for {name}"))
            .interact()
            .map_err(|e| HoneyVaultError::CommandFailed(format!("input prompt: {e}")))?
    });

    let service = open_service(cli)?;
    let master_key = prompt_master_key(vault)?;
    let added = service.add_entry(vault, &master_key, name, secret, &entry_value)?;

    output::success(&format!(
        "Added '{name}' to vault '{vault}' with {} decoy(s)",
        added.decoys
    ));
    if added.decoys == 0 {
        output::warning("No usable decoys were suggested; this entry is stored without cover.");
    }

    Ok(())
}
