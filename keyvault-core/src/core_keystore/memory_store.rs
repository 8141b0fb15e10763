//! In-memory record store
//!
//! Keeps each record in its stored JSON form, keyed by the hex key id, so
//! every fetch goes through the same decoding as a Vault read.

use super::backend::RecordStore;
use super::errors::{KeyStoreError, KeyStoreResult};
use super::record::{KeyRecord, StoredKeyRecord};
use crate::core_keys::KeyId;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory record store (non-persistent, for tests and embedding)
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored JSON payload for `key_id`
    pub async fn raw(&self, key_id: &KeyId) -> Option<Value> {
        self.records.read().await.get(&key_id.to_hex()).cloned()
    }

    /// Overwrite the stored payload for `key_id` without any validation
    pub async fn insert_raw(&self, key_id: &KeyId, payload: Value) {
        self.records.write().await.insert(key_id.to_hex(), payload);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save_record(&self, key_id: &KeyId, record: &KeyRecord) -> KeyStoreResult<()> {
        let payload = serde_json::to_value(record.to_stored())
            .map_err(|e| KeyStoreError::MalformedData(e.to_string()))?;
        self.records.write().await.insert(key_id.to_hex(), payload);
        Ok(())
    }

    async fn fetch_record(&self, key_id: &KeyId) -> KeyStoreResult<Option<KeyRecord>> {
        let Some(payload) = self.raw(key_id).await else {
            return Ok(None);
        };
        let stored: StoredKeyRecord = serde_json::from_value(payload)
            .map_err(|e| KeyStoreError::MalformedData(e.to_string()))?;
        KeyRecord::from_stored(&stored).map(Some)
    }
}
