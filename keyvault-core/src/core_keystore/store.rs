//! Private key store
//!
//! Typed save/fetch operations for each key kind, on top of any `RecordStore`.
//! Nothing is cached: every fetch goes to the backend.

use super::backend::RecordStore;
use super::codec::{self, NodeKeyPair};
use super::errors::KeyStoreResult;
use crate::core_keys::{KeyId, NodeCertificate, NodePrivateKey, NodePublicKey, SessionPrivateKey};
use tracing::info;

pub struct PrivateKeyStore<S> {
    backend: S,
}

impl<S: RecordStore> PrivateKeyStore<S> {
    pub fn new(backend: S) -> Self {
        PrivateKeyStore { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Save a node key under its certificate's serial number, which is returned
    pub async fn save_node_key(
        &self,
        private_key: &NodePrivateKey,
        certificate: &NodeCertificate,
    ) -> KeyStoreResult<KeyId> {
        let key_id = certificate.serial_number().clone();
        let record = codec::encode_node_key(private_key, certificate)?;
        self.backend.save_record(&key_id, &record).await?;

        info!(key_id = %key_id, "Saved node key");
        Ok(key_id)
    }

    /// Save a session key that is not yet bound to a correspondent
    pub async fn save_initial_session_key(
        &self,
        private_key: &SessionPrivateKey,
        key_id: &KeyId,
    ) -> KeyStoreResult<()> {
        let record = codec::encode_initial_session_key(private_key)?;
        self.backend.save_record(key_id, &record).await?;

        info!(key_id = %key_id, "Saved initial session key");
        Ok(())
    }

    /// Save a session key bound to the correspondent owning `peer_public_key`
    pub async fn save_subsequent_session_key(
        &self,
        private_key: &SessionPrivateKey,
        key_id: &KeyId,
        peer_public_key: &NodePublicKey,
    ) -> KeyStoreResult<()> {
        let record = codec::encode_subsequent_session_key(private_key, peer_public_key)?;
        self.backend.save_record(key_id, &record).await?;

        info!(key_id = %key_id, "Saved subsequent session key");
        Ok(())
    }

    pub async fn fetch_node_key(&self, key_id: &KeyId) -> KeyStoreResult<Option<NodeKeyPair>> {
        match self.backend.fetch_record(key_id).await? {
            Some(record) => codec::decode_node_key(key_id, &record).map(Some),
            None => Ok(None),
        }
    }

    /// Fetch a session key that must still be unbound
    pub async fn fetch_initial_session_key(
        &self,
        key_id: &KeyId,
    ) -> KeyStoreResult<Option<SessionPrivateKey>> {
        match self.backend.fetch_record(key_id).await? {
            Some(record) => codec::decode_initial_session_key(key_id, &record).map(Some),
            None => Ok(None),
        }
    }

    /// Fetch a session key for use with the correspondent owning `peer_public_key`.
    ///
    /// Fails with `BindingMismatch` if the key is bound to a different correspondent.
    pub async fn fetch_session_key(
        &self,
        key_id: &KeyId,
        peer_public_key: &NodePublicKey,
    ) -> KeyStoreResult<Option<SessionPrivateKey>> {
        match self.backend.fetch_record(key_id).await? {
            Some(record) => codec::decode_session_key(key_id, &record, peer_public_key).map(Some),
            None => Ok(None),
        }
    }
}
