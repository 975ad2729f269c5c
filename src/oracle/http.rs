//! HTTP client for the decoy suggestion service.
//!
//! `GET /api/list?secret=<hint>&cred=<name>` answers with free text that
//! should contain a JSON array of strings.  The array is cut out from the
//! first `[` to the last `]` before decoding; anything that does not
//! decode is treated as the oracle being unavailable.

use std::time::Duration;

use tracing::{debug, warn};

use super::DecoyOracle;
use crate::errors::{HoneyVaultError, Result};

/// Oracle backed by a remote suggestion service.
pub struct HttpDecoyOracle {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpDecoyOracle {
    /// Build a client for `base_url` (e.g. `http://localhost:44518/api`).
    ///
    /// `timeout` bounds the whole request; hitting it is `OracleUnavailable`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: config.into(),
        }
    }
}

impl DecoyOracle for HttpDecoyOracle {
    fn suggest_decoys(&self, name: &str, secret_hint: &str) -> Result<Vec<String>> {
        let url = format!("{}/list", self.base_url);
        debug!(%url, name, "requesting decoy suggestions");

        let mut response = self
            .agent
            .get(&url)
            .query("secret", secret_hint)
            .query("cred", name)
            .call()
            .map_err(|e| {
                warn!(error = %e, "decoy oracle request failed");
                HoneyVaultError::OracleUnavailable(e.to_string())
            })?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| HoneyVaultError::OracleUnavailable(format!("reading response: {e}")))?;

        parse_suggestions(&body)
    }
}

/// Slice of `text` from the first `[` to the last `]`, inclusive.
pub fn extract_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode the suggestion list embedded in an oracle response.
pub fn parse_suggestions(text: &str) -> Result<Vec<String>> {
    let array = extract_array(text).ok_or_else(|| {
        HoneyVaultError::OracleUnavailable("response contains no suggestion list".into())
    })?;
    serde_json::from_str(array)
        .map_err(|e| HoneyVaultError::OracleUnavailable(format!("malformed suggestion list: {e}")))
}
