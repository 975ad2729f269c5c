use clap::Parser;
use honeyvault::cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Commands::CreateVault { ref vault } => {
            honeyvault::cli::commands::create_vault::execute(&cli, vault)
        }
        Commands::Add {
            ref vault,
            ref name,
            ref secret,
            ref value,
        } => honeyvault::cli::commands::add::execute(&cli, vault, name, secret, value.as_deref()),
        Commands::Get {
            ref vault,
            ref name,
            ref secret,
        } => honeyvault::cli::commands::get::execute(&cli, vault, name, secret),
        Commands::Delete {
            ref vault,
            ref name,
            ref secret,
            force,
        } => honeyvault::cli::commands::delete::execute(&cli, vault, name, secret, force),
        Commands::DeleteVault { ref vault, force } => {
            honeyvault::cli::commands::delete_vault::execute(&cli, vault, force)
        }
        Commands::List { ref vault } => honeyvault::cli::commands::list::execute(&cli, vault),
        Commands::Alerts { ref vault, last } => {
            honeyvault::cli::commands::alerts::execute(&cli, vault.as_deref(), last)
        }
        Commands::Vaults => honeyvault::cli::commands::vaults::execute(&cli),
    };

    if let Err(e) = result {
        honeyvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr.  `RUST_LOG` wins over `-v`.
fn setup_tracing(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "honeyvault=info",
        _ => "honeyvault=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
