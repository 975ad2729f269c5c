//! One module per subcommand.

pub mod add;
pub mod alerts;
pub mod create_vault;
pub mod delete;
pub mod delete_vault;
pub mod get;
pub mod list;
pub mod vaults;
