//! Private key store for relay nodes
//!
//! Node keys (Ed25519 plus a certificate) and session keys (X25519) are kept
//! in a Vault KV v2 secrets engine, one secret per key id.
//!
//! ```no_run
//! use keyvault_core::{config::Config, PrivateKeyStore, VaultRecordStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! keyvault_core::logging::init_logging_from(&config.logging)?;
//!
//! let store = PrivateKeyStore::new(VaultRecordStore::from_config(&config.vault)?);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core_keys;
pub mod core_keystore;
pub mod logging;
pub mod metrics;

pub use core_keys::{KeyId, NodeCertificate, NodePrivateKey, SessionPrivateKey};
pub use core_keystore::{
    KeyStoreError, KeyStoreResult, MemoryRecordStore, PrivateKeyStore, RecordStore,
    VaultRecordStore,
};
pub use logging::{init_logging, LogLevel};
