//! HashiCorp Vault KV v2 record store
//!
//! Records live under `{vault_url}/v1/{kv_path}/data/{hex(key_id)}`:
//! - save  -> `POST` with `{"data": <stored record>}`, success on 200 or 204
//! - fetch -> `GET`, 200 returns `{"data": {"data": <stored record>}}`, 404 means absent
//!
//! The token goes out as `X-Vault-Token` on every request. Connections are
//! pooled and kept alive; every request is bounded by a fixed timeout and is
//! never retried here.
//!
//! Security: transport errors can carry request details. Every call site maps
//! them through `sanitize_transport_error` before they leave this module.

use super::backend::RecordStore;
use super::errors::{KeyStoreError, KeyStoreResult, Operation};
use super::record::{KeyRecord, StoredKeyRecord};
use crate::config::VaultConfig;
use crate::core_keys::KeyId;
use crate::metrics::record_vault_request;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

const TOKEN_HEADER: &str = "X-Vault-Token";
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Record store backed by a Vault KV v2 secrets engine
#[derive(Debug, Clone)]
pub struct VaultRecordStore {
    client: Client,
    base_url: String,
}

impl VaultRecordStore {
    /// Create a client with the default timeout
    pub fn new(vault_url: &str, token: SecretString, kv_path: &str) -> KeyStoreResult<Self> {
        Self::with_timeout(vault_url, token, kv_path, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        vault_url: &str,
        token: SecretString,
        kv_path: &str,
        timeout: Duration,
    ) -> KeyStoreResult<Self> {
        if normalize_kv_path(kv_path).is_empty() {
            return Err(KeyStoreError::Configuration(
                "KV path must not be empty".to_string(),
            ));
        }
        let base_url = build_base_url(vault_url, kv_path);
        Url::parse(&base_url).map_err(|e| {
            KeyStoreError::Configuration(format!("invalid Vault URL {}: {}", base_url, e))
        })?;

        let mut token_value = HeaderValue::from_str(token.expose_secret()).map_err(|_| {
            KeyStoreError::Configuration("Vault token is not a valid header value".to_string())
        })?;
        token_value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .tcp_keepalive(KEEPALIVE_INTERVAL)
            .build()
            .map_err(|e| KeyStoreError::Configuration(e.without_url().to_string()))?;

        Ok(VaultRecordStore { client, base_url })
    }

    /// Create a client from configuration. The token must be set.
    pub fn from_config(config: &VaultConfig) -> KeyStoreResult<Self> {
        let token = config.token.as_ref().ok_or_else(|| {
            KeyStoreError::Configuration("Vault token is not configured".to_string())
        })?;
        Self::with_timeout(
            &config.url,
            SecretString::new(token.expose_secret().clone()),
            &config.kv_path,
            config.timeout,
        )
    }

    /// Canonical base URL that key ids are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, key_id: &KeyId) -> String {
        format!("{}/{}", self.base_url, key_id.to_hex())
    }
}

#[async_trait]
impl RecordStore for VaultRecordStore {
    async fn save_record(&self, key_id: &KeyId, record: &KeyRecord) -> KeyStoreResult<()> {
        let started = Instant::now();
        debug!(key_id = %key_id, kind = %record.kind(), "Saving key record to Vault");

        let stored = record.to_stored();
        let body = VaultWriteRequest { data: &stored };
        let response = match self
            .client
            .post(self.record_url(key_id))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(transport_failure(Operation::Save, e, started)),
        };

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                record_vault_request(Operation::Save, "ok", started.elapsed());
                Ok(())
            }
            status => Err(rejected(Operation::Save, status, started)),
        }
    }

    async fn fetch_record(&self, key_id: &KeyId) -> KeyStoreResult<Option<KeyRecord>> {
        let started = Instant::now();
        debug!(key_id = %key_id, "Fetching key record from Vault");

        let response = match self.client.get(self.record_url(key_id)).send().await {
            Ok(response) => response,
            Err(e) => return Err(transport_failure(Operation::Retrieve, e, started)),
        };

        match response.status() {
            StatusCode::NOT_FOUND => {
                record_vault_request(Operation::Retrieve, "not_found", started.elapsed());
                Ok(None)
            }
            StatusCode::OK => {
                let body = match response.bytes().await {
                    Ok(body) => body,
                    Err(e) => return Err(transport_failure(Operation::Retrieve, e, started)),
                };
                record_vault_request(Operation::Retrieve, "ok", started.elapsed());

                let secret: VaultReadResponse = serde_json::from_slice(&body).map_err(|e| {
                    KeyStoreError::MalformedData(format!("invalid Vault response: {}", e))
                })?;
                KeyRecord::from_stored(&secret.data.data).map(Some)
            }
            status => Err(rejected(Operation::Retrieve, status, started)),
        }
    }
}

/// Map a transport error to `KeyStoreError::Transport`.
///
/// Only the error's own description and its root cause survive; the request
/// URL is stripped and nothing from the request or response is kept.
pub fn sanitize_transport_error(operation: Operation, err: reqwest::Error) -> KeyStoreError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        let err = err.without_url();
        match root_cause(&err) {
            Some(cause) => format!("{}: {}", err, cause),
            None => err.to_string(),
        }
    };
    KeyStoreError::Transport { operation, message }
}

fn root_cause(err: &(dyn StdError + 'static)) -> Option<String> {
    let mut source = err.source()?;
    while let Some(next) = source.source() {
        source = next;
    }
    Some(source.to_string())
}

fn transport_failure(operation: Operation, err: reqwest::Error, started: Instant) -> KeyStoreError {
    record_vault_request(operation, "transport_error", started.elapsed());
    let err = sanitize_transport_error(operation, err);
    warn!(operation = %operation, error = %err, "Vault request failed");
    err
}

fn rejected(operation: Operation, status: StatusCode, started: Instant) -> KeyStoreError {
    record_vault_request(operation, "rejected", started.elapsed());
    warn!(operation = %operation, status = status.as_u16(), "Vault rejected key store request");
    KeyStoreError::BackendRejected {
        operation,
        status: status.as_u16(),
    }
}

/// Strip trailing slashes from the Vault server URL
pub fn normalize_vault_url(vault_url: &str) -> String {
    vault_url.trim_end_matches('/').to_string()
}

/// Drop leading, trailing and repeated slashes from a KV path
pub fn normalize_kv_path(kv_path: &str) -> String {
    kv_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// `{vault_url}/v1/{kv_path}/data`, both parts normalized
pub fn build_base_url(vault_url: &str, kv_path: &str) -> String {
    format!(
        "{}/v1/{}/data",
        normalize_vault_url(vault_url),
        normalize_kv_path(kv_path)
    )
}

#[derive(Serialize)]
struct VaultWriteRequest<'a> {
    data: &'a StoredKeyRecord,
}

#[derive(Deserialize)]
struct VaultReadResponse {
    data: VaultSecret,
}

#[derive(Deserialize)]
struct VaultSecret {
    data: StoredKeyRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token() -> SecretString {
        SecretString::new("letmein".to_string())
    }

    #[test]
    fn test_base_url_includes_vault_url_and_kv_path() {
        assert_eq!(
            build_base_url("http://localhost:8200", "pohttp-private-keys"),
            "http://localhost:8200/v1/pohttp-private-keys/data"
        );
    }

    #[test]
    fn test_base_url_is_normalized() {
        assert_eq!(
            build_base_url("http://localhost:8200/", "/pohttp-private-keys/"),
            "http://localhost:8200/v1/pohttp-private-keys/data"
        );
        assert_eq!(
            build_base_url("http://localhost:8200//", "//secret//node-keys/"),
            "http://localhost:8200/v1/secret/node-keys/data"
        );
        assert_eq!(normalize_vault_url("http://h/"), normalize_vault_url("http://h"));
    }

    #[test]
    fn test_client_exposes_base_url() {
        let store = VaultRecordStore::new("http://localhost:8200/", token(), "/keys").unwrap();
        assert_eq!(store.base_url(), "http://localhost:8200/v1/keys/data");
        assert_eq!(
            store.record_url(&KeyId::new(vec![9, 7, 5, 3, 1]).unwrap()),
            "http://localhost:8200/v1/keys/data/0907050301"
        );
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(matches!(
            VaultRecordStore::new("", token(), "keys"),
            Err(KeyStoreError::Configuration(_))
        ));
        assert!(matches!(
            VaultRecordStore::new("http://localhost:8200", token(), "///"),
            Err(KeyStoreError::Configuration(_))
        ));
        assert!(matches!(
            VaultRecordStore::new("http://localhost:8200", SecretString::new("bad\ntoken".into()), "keys"),
            Err(KeyStoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_config_requires_token() {
        let config = VaultConfig::default();
        assert!(matches!(
            VaultRecordStore::from_config(&config),
            Err(KeyStoreError::Configuration(_))
        ));

        let config = VaultConfig {
            token: Some(token()),
            ..VaultConfig::default()
        };
        assert!(VaultRecordStore::from_config(&config).is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let store = VaultRecordStore::new("http://localhost:8200", token(), "keys").unwrap();
        assert!(!format!("{:?}", store).contains("letmein"));
    }

    proptest! {
        #[test]
        fn prop_normalization_idempotent(url in "[a-z:/]{0,24}", path in "[a-z/]{0,24}") {
            let url_once = normalize_vault_url(&url);
            prop_assert_eq!(normalize_vault_url(&url_once), url_once.clone());

            let path_once = normalize_kv_path(&path);
            prop_assert_eq!(normalize_kv_path(&path_once), path_once);

            prop_assert_eq!(normalize_vault_url(&format!("{}/", url)), url_once);
        }
    }
}
