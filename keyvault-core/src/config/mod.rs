//! Configuration management for the key store
//!
//! Settings come from defaults, an optional TOML file and environment
//! variables (which win). The Vault token is only ever read from the
//! environment; it is never loaded from or written to a file.

use crate::core_keystore::{build_base_url, normalize_kv_path, DEFAULT_TIMEOUT};
use crate::logging::LogLevel;
use humantime_serde::re::humantime;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

mod error;

pub use error::ConfigError;

pub const ENV_VAULT_URL: &str = "KEYVAULT_VAULT_URL";
pub const ENV_VAULT_TOKEN: &str = "KEYVAULT_VAULT_TOKEN";
pub const ENV_VAULT_KV_PATH: &str = "KEYVAULT_VAULT_KV_PATH";
pub const ENV_VAULT_TIMEOUT: &str = "KEYVAULT_VAULT_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "KEYVAULT_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "KEYVAULT_LOG_JSON";

/// Main configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Vault backend configuration
    pub vault: VaultConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Vault backend configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault server URL, e.g. `https://vault.internal:8200`
    pub url: String,

    /// Path of the KV v2 mount and prefix the keys live under
    pub kv_path: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// Vault token (environment only)
    #[serde(skip)]
    pub token: Option<SecretString>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8200".to_string(),
            kv_path: "secret/private-keys".to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        // Vault config
        if let Some(url) = lookup(ENV_VAULT_URL) {
            self.vault.url = url;
        }
        if let Some(token) = lookup(ENV_VAULT_TOKEN) {
            self.vault.token = Some(SecretString::new(token));
        }
        if let Some(kv_path) = lookup(ENV_VAULT_KV_PATH) {
            self.vault.kv_path = kv_path;
        }
        if let Some(timeout) = lookup(ENV_VAULT_TIMEOUT) {
            self.vault.timeout =
                humantime::parse_duration(&timeout).map_err(|e| ConfigError::InvalidValue {
                    name: ENV_VAULT_TIMEOUT,
                    reason: e.to_string(),
                })?;
        }

        // Logging config
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            self.logging.json_format = json.parse().map_err(|e: std::str::ParseBoolError| {
                ConfigError::InvalidValue {
                    name: ENV_LOG_JSON,
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if normalize_kv_path(&self.vault.kv_path).is_empty() {
            return Err(ConfigError::ValidationFailed(
                "vault.kv_path must not be empty".to_string(),
            ));
        }

        let base_url = build_base_url(&self.vault.url, &self.vault.kv_path);
        reqwest::Url::parse(&base_url).map_err(|e| {
            ConfigError::ValidationFailed(format!("Invalid vault.url {}: {}", self.vault.url, e))
        })?;

        if self.vault.timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "vault.timeout must be greater than 0".to_string(),
            ));
        }

        if self.logging.level.parse::<LogLevel>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file. The token is not written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
