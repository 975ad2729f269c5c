//! Client for a remote key directory service.
//!
//! Wire contract:
//!
//! ```text
//! GET    /api/clouddb/entry?vaultName=&name=&secret=   -> {success, key, isReal}   (404 if absent)
//! POST   /api/clouddb/entry          [KeyRecord, ...]  -> {success}
//! DELETE /api/clouddb/entries?vaultName=[&name=]       -> {success}
//! GET    /api/alerts                                   -> {success, alerts}
//! ```
//!
//! The remote side records alerts itself; this client never does.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{Alert, KeyDirectory, KeyLookup, KeyRecord};
use crate::errors::{HoneyVaultError, Result};

/// Response body shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    success: bool,
    key: Option<String>,
    is_real: Option<serde_json::Value>,
    error: Option<String>,
    message: Option<String>,
    #[serde(default)]
    alerts: Vec<Alert>,
}

impl Envelope {
    fn failure_reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request rejected".to_string())
    }
}

/// HTTP key directory client.
pub struct HttpKeyDirectory {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpKeyDirectory {
    /// Build a client for `base_url` (e.g. `http://localhost:45107/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: config.into(),
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn transport(e: ureq::Error) -> HoneyVaultError {
    HoneyVaultError::DirectoryError(e.to_string())
}

fn read_envelope(mut response: ureq::http::Response<ureq::Body>) -> Result<Envelope> {
    let body = response.body_mut().read_to_string().map_err(transport)?;
    parse_envelope(&body)
}

fn parse_envelope(body: &str) -> Result<Envelope> {
    serde_json::from_str(body)
        .map_err(|e| HoneyVaultError::DirectoryError(format!("malformed response: {e}")))
}

/// Turn a lookup response into a `KeyLookup`.
fn lookup_from(envelope: Envelope) -> Result<KeyLookup> {
    if !envelope.success {
        return Err(HoneyVaultError::DirectoryError(envelope.failure_reason()));
    }
    let key = envelope
        .key
        .ok_or_else(|| HoneyVaultError::DirectoryError("response carries no key".into()))?;
    let is_real = match envelope.is_real {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_i64().is_some_and(|i| i != 0),
        _ => {
            return Err(HoneyVaultError::DirectoryError(
                "response carries no isReal flag".into(),
            ))
        }
    };
    Ok(KeyLookup { key, is_real })
}

fn expect_success(envelope: &Envelope) -> Result<()> {
    if envelope.success {
        Ok(())
    } else {
        Err(HoneyVaultError::DirectoryError(envelope.failure_reason()))
    }
}

impl KeyDirectory for HttpKeyDirectory {
    fn lookup(&self, vault_name: &str, name: &str, secret: &str) -> Result<Option<KeyLookup>> {
        let response = self
            .agent
            .get(&self.url("clouddb/entry"))
            .query("vaultName", vault_name)
            .query("name", name)
            .query("secret", secret)
            .call();

        match response {
            Ok(response) => lookup_from(read_envelope(response)?).map(Some),
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(transport(e)),
        }
    }

    fn insert_batch(&self, records: &[KeyRecord]) -> Result<()> {
        debug!(count = records.len(), url = %self.base_url, "pushing key records");
        let response = self
            .agent
            .post(&self.url("clouddb/entry"))
            .send_json(records)
            .map_err(transport)?;
        expect_success(&read_envelope(response)?)
    }

    fn delete_by_vault(&self, vault_name: &str) -> Result<()> {
        let response = self
            .agent
            .delete(&self.url("clouddb/entries"))
            .query("vaultName", vault_name)
            .call()
            .map_err(transport)?;
        expect_success(&read_envelope(response)?)
    }

    fn delete_by_vault_and_name(&self, vault_name: &str, name: &str) -> Result<()> {
        let response = self
            .agent
            .delete(&self.url("clouddb/entries"))
            .query("vaultName", vault_name)
            .query("name", name)
            .call()
            .map_err(transport)?;
        expect_success(&read_envelope(response)?)
    }

    fn list_alerts(&self) -> Result<Vec<Alert>> {
        let response = self
            .agent
            .get(&self.url("alerts"))
            .call()
            .map_err(transport)?;
        let envelope = read_envelope(response)?;
        expect_success(&envelope)?;

        let mut alerts = envelope.alerts;
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_accepts_numeric_and_boolean_flags() {
        let numeric = parse_envelope(r#"{"success":true,"key":"abc","isReal":0}"#).unwrap();
        assert_eq!(
            lookup_from(numeric).unwrap(),
            KeyLookup {
                key: "abc".into(),
                is_real: false
            }
        );

        let boolean = parse_envelope(r#"{"success":true,"key":"abc","isReal":true}"#).unwrap();
        assert!(lookup_from(boolean).unwrap().is_real);
    }

    #[test]
    fn lookup_without_flag_is_rejected() {
        let envelope = parse_envelope(r#"{"success":true,"key":"abc"}"#).unwrap();
        assert!(matches!(
            lookup_from(envelope),
            Err(HoneyVaultError::DirectoryError(_))
        ));
    }

    #[test]
    fn failure_reason_prefers_error_field() {
        let envelope = parse_envelope(r#"{"success":false,"error":"disk full"}"#).unwrap();
        assert_eq!(envelope.failure_reason(), "disk full");
        assert!(expect_success(&envelope).is_err());
    }

    #[test]
    fn alerts_decode_from_envelope() {
        let body = r#"{"success":true,"alerts":[
            {"vaultName":"bank","name":"login","secret":"p4ss1","timestamp":"2024-01-02T03:04:05Z"}
        ]}"#;
        let envelope = parse_envelope(body).unwrap();
        assert_eq!(envelope.alerts.len(), 1);
        assert_eq!(envelope.alerts[0].secret, "p4ss1");
    }

    #[test]
    fn malformed_body_is_directory_error() {
        assert!(matches!(
            parse_envelope("<html>oops</html>"),
            Err(HoneyVaultError::DirectoryError(_))
        ));
    }

    #[test]
    fn unreachable_directory_fails_cleanly() {
        let directory = HttpKeyDirectory::new("http://127.0.0.1:1/api/", Duration::from_secs(2));
        assert_eq!(directory.base_url(), "http://127.0.0.1:1/api");
        assert!(matches!(
            directory.insert_batch(&[]),
            Err(HoneyVaultError::DirectoryError(_))
        ));
    }
}
