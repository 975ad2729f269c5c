//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::directory::Alert;
use crate::vault::VaultSummary;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print decoy access alerts (Time, Vault, Name, Secret used).
pub fn print_alerts_table(alerts: &[Alert]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Vault", "Name", "Secret used"]);

    for alert in alerts {
        table.add_row(vec![
            alert.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            alert.vault_name.clone(),
            alert.name.clone(),
            style(&alert.secret).red().to_string(),
        ]);
    }

    println!(
        "{}",
        style(format!("{} decoy access alert(s):", alerts.len())).bold()
    );
    println!("{table}");
}

/// Print registered vaults (Vault, Created).
pub fn print_vaults_table(vaults: &[VaultSummary]) {
    if vaults.is_empty() {
        info("No vaults registered yet.");
        tip("Run `honeyvault create-vault <VAULT>` to create one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Vault", "Created"]);

    for v in vaults {
        table.add_row(vec![
            v.vault_name.clone(),
            v.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print credential names with their stored row counts.
pub fn print_names_table(vault: &str, names: &[(String, usize)]) {
    if names.is_empty() {
        info(&format!("No entries in '{vault}' yet."));
        tip("Run `honeyvault add <VAULT> <NAME> <SECRET>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Stored rows"]);

    for (name, rows) in names {
        table.add_row(vec![name.clone(), rows.to_string()]);
    }

    println!("{table}");
}
