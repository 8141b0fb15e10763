//! Record store abstraction
//!
//! The capability a storage backend needs to offer the key store: write a
//! whole record under a key id, and read it back.

use super::errors::KeyStoreResult;
use super::record::KeyRecord;
use crate::core_keys::KeyId;
use async_trait::async_trait;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Write `record` under `key_id`, replacing any previous record
    async fn save_record(&self, key_id: &KeyId, record: &KeyRecord) -> KeyStoreResult<()>;

    /// Read the record stored under `key_id`, or `None` if there is none
    async fn fetch_record(&self, key_id: &KeyId) -> KeyStoreResult<Option<KeyRecord>>;
}
