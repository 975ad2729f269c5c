//! Decoy oracles: sources of plausible alternative secrets.
//!
//! Given a credential name and the secret a user remembers, an oracle
//! returns candidate secrets that look like near-misses of it.  The vault
//! service treats the output as untrusted: it bounds, filters and
//! de-duplicates candidates before they become decoys.
//!
//! - [`HttpDecoyOracle`] queries a suggestion service over HTTP.
//! - [`RandomDecoyOracle`] draws random strings of the hint's length and
//!   needs no network.

pub mod http;
pub mod random;

use crate::errors::Result;

pub use http::{extract_array, HttpDecoyOracle};
pub use random::RandomDecoyOracle;

/// Source of decoy candidates for one credential.
pub trait DecoyOracle: Send + Sync {
    /// Suggest alternates for `secret_hint`, in the oracle's order.
    ///
    /// Any failure, including a timeout, is `OracleUnavailable`.
    fn suggest_decoys(&self, name: &str, secret_hint: &str) -> Result<Vec<String>>;
}
