//! Key record codec
//!
//! Converts between live key objects and `KeyRecord`s, and on the way back
//! checks that the stored classification is the one the caller asked for.
//! For bound session keys the stored digest must match the caller's
//! expected peer before the key is released.

use super::errors::{KeyStoreError, KeyStoreResult};
use super::record::KeyRecord;
use crate::core_keys::{
    KeyId, NodeCertificate, NodePrivateKey, NodePublicKey, PeerKeyDigest, SessionPrivateKey,
};

/// Node key together with its certificate
#[derive(Debug, Clone)]
pub struct NodeKeyPair {
    pub private_key: NodePrivateKey,
    pub certificate: NodeCertificate,
}

pub fn encode_node_key(
    private_key: &NodePrivateKey,
    certificate: &NodeCertificate,
) -> KeyStoreResult<KeyRecord> {
    Ok(KeyRecord::Node {
        private_key: private_key.to_der()?,
        certificate: certificate.to_bytes()?,
    })
}

pub fn encode_initial_session_key(private_key: &SessionPrivateKey) -> KeyStoreResult<KeyRecord> {
    Ok(KeyRecord::InitialSession {
        private_key: private_key.to_der()?,
    })
}

pub fn encode_subsequent_session_key(
    private_key: &SessionPrivateKey,
    peer_public_key: &NodePublicKey,
) -> KeyStoreResult<KeyRecord> {
    Ok(KeyRecord::SubsequentSession {
        private_key: private_key.to_der()?,
        peer_public_key_digest: PeerKeyDigest::of(peer_public_key)?,
    })
}

/// Decode a node key. The certificate serial must equal the id it was stored under.
pub fn decode_node_key(key_id: &KeyId, record: &KeyRecord) -> KeyStoreResult<NodeKeyPair> {
    match record {
        KeyRecord::Node {
            private_key,
            certificate,
        } => {
            let certificate = NodeCertificate::from_bytes(certificate)?;
            if certificate.serial_number() != key_id {
                return Err(KeyStoreError::MalformedData(format!(
                    "certificate serial {} does not match key id {}",
                    certificate.serial_number(),
                    key_id
                )));
            }
            Ok(NodeKeyPair {
                private_key: NodePrivateKey::from_der(private_key)?,
                certificate,
            })
        }
        other => Err(type_mismatch(key_id, "node", other)),
    }
}

/// Decode a session key that must still be unbound
pub fn decode_initial_session_key(
    key_id: &KeyId,
    record: &KeyRecord,
) -> KeyStoreResult<SessionPrivateKey> {
    match record {
        KeyRecord::InitialSession { private_key } => Ok(SessionPrivateKey::from_der(private_key)?),
        other => Err(type_mismatch(key_id, "initial session", other)),
    }
}

/// Decode a session key for use with `peer_public_key`.
///
/// Unbound keys are released for any peer. Bound keys are released only if
/// their digest matches the digest of `peer_public_key`.
pub fn decode_session_key(
    key_id: &KeyId,
    record: &KeyRecord,
    peer_public_key: &NodePublicKey,
) -> KeyStoreResult<SessionPrivateKey> {
    match record {
        KeyRecord::InitialSession { private_key } => Ok(SessionPrivateKey::from_der(private_key)?),
        KeyRecord::SubsequentSession {
            private_key,
            peer_public_key_digest,
        } => {
            let expected = PeerKeyDigest::of(peer_public_key)?;
            if expected != *peer_public_key_digest {
                return Err(KeyStoreError::BindingMismatch {
                    key_id: key_id.clone(),
                });
            }
            Ok(SessionPrivateKey::from_der(private_key)?)
        }
        other => Err(type_mismatch(key_id, "session", other)),
    }
}

fn type_mismatch(key_id: &KeyId, expected: &'static str, record: &KeyRecord) -> KeyStoreError {
    KeyStoreError::TypeMismatch {
        key_id: key_id.clone(),
        expected,
        actual: record.kind(),
    }
}
