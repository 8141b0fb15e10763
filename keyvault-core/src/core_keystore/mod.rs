//! Private key store module
//!
//! Persists node and session private keys in a remote KV secrets backend.
//!
//! - `codec` -> key objects <-> `KeyRecord`, with classification and peer-binding checks
//! - `RecordStore` -> the save/fetch capability a backend provides
//! - `VaultRecordStore` -> Vault KV v2 over HTTP(S)
//! - `MemoryRecordStore` -> in-process backend
//! - `PrivateKeyStore` -> typed operations per key kind

mod backend;
pub mod codec;
mod errors;
mod memory_store;
mod record;
mod store;
mod vault_client;

pub use backend::RecordStore;
pub use codec::NodeKeyPair;
pub use errors::{KeyStoreError, KeyStoreResult, Operation};
pub use memory_store::MemoryRecordStore;
pub use record::{KeyKind, KeyRecord, StoredKeyRecord};
pub use store::PrivateKeyStore;
pub use vault_client::{
    build_base_url, normalize_kv_path, normalize_vault_url, sanitize_transport_error,
    VaultRecordStore, DEFAULT_TIMEOUT,
};
