//! `honeyvault alerts`: display recorded decoy accesses.
//!
//! Usage:
//!   honeyvault alerts                 # newest 50 alerts
//!   honeyvault alerts --last 10       # newest 10
//!   honeyvault alerts --vault bank    # only alerts for `bank`

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::directory::Alert;
use crate::errors::Result;

/// Execute the `alerts` command.
pub fn execute(cli: &Cli, vault: Option<&str>, last: usize) -> Result<()> {
    let service = open_service(cli)?;

    let alerts = match vault {
        Some(v) => service.list_alerts_for(v)?,
        None => service.list_alerts()?,
    };
    let alerts = newest(alerts, last);

    if alerts.is_empty() {
        output::info("No decoy access recorded.");
        return Ok(());
    }

    output::print_alerts_table(&alerts);
    Ok(())
}

/// Keep the first `last` alerts of a newest-first list.
fn newest(mut alerts: Vec<Alert>, last: usize) -> Vec<Alert> {
    alerts.truncate(last);
    alerts
}
