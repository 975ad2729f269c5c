//! Configuration loaded from `honeyvault.toml`.

pub mod settings;

pub use settings::{DecoyResponse, OracleKind, Settings};
