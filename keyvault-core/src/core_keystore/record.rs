//! Key records
//!
//! `KeyRecord` is the durable unit: encoded private key plus whatever metadata
//! its kind requires. Each kind has its own variant so a node key can never
//! carry a peer binding and a bound session key can never carry a certificate.
//!
//! `StoredKeyRecord` is the flat form written to the Vault KV engine:
//!
//! ```json
//! {"privateKey": "<base64>", "type": "session-subsequent", "recipientPublicKeyDigest": "<hex>"}
//! ```

use super::errors::{KeyStoreError, KeyStoreResult};
use crate::core_keys::PeerKeyDigest;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

/// Key classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyKind {
    /// Long-term node identity key
    Node,
    /// Session key not yet used with any correspondent
    SessionInitial,
    /// Session key bound to one correspondent
    SessionSubsequent,
}

impl KeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Node => "node",
            KeyKind::SessionInitial => "session-initial",
            KeyKind::SessionSubsequent => "session-subsequent",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KeyKind {
    type Err = KeyStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(KeyKind::Node),
            "session-initial" => Ok(KeyKind::SessionInitial),
            "session-subsequent" => Ok(KeyKind::SessionSubsequent),
            other => Err(KeyStoreError::MalformedData(format!("unknown key type: {}", other))),
        }
    }
}

/// Encoded private key with the metadata of its kind
#[derive(Clone, PartialEq, Eq)]
pub enum KeyRecord {
    Node {
        private_key: Zeroizing<Vec<u8>>,
        certificate: Vec<u8>,
    },
    InitialSession {
        private_key: Zeroizing<Vec<u8>>,
    },
    SubsequentSession {
        private_key: Zeroizing<Vec<u8>>,
        peer_public_key_digest: PeerKeyDigest,
    },
}

impl KeyRecord {
    pub fn kind(&self) -> KeyKind {
        match self {
            KeyRecord::Node { .. } => KeyKind::Node,
            KeyRecord::InitialSession { .. } => KeyKind::SessionInitial,
            KeyRecord::SubsequentSession { .. } => KeyKind::SessionSubsequent,
        }
    }

    /// DER encoded private key
    pub fn private_key(&self) -> &[u8] {
        match self {
            KeyRecord::Node { private_key, .. }
            | KeyRecord::InitialSession { private_key }
            | KeyRecord::SubsequentSession { private_key, .. } => private_key.as_slice(),
        }
    }

    /// Flatten into the stored form, base64-encoding binary fields
    pub fn to_stored(&self) -> StoredKeyRecord {
        let (certificate, recipient_public_key_digest) = match self {
            KeyRecord::Node { certificate, .. } => (Some(STANDARD.encode(certificate)), None),
            KeyRecord::InitialSession { .. } => (None, None),
            KeyRecord::SubsequentSession {
                peer_public_key_digest,
                ..
            } => (None, Some(peer_public_key_digest.to_hex())),
        };

        StoredKeyRecord {
            private_key: STANDARD.encode(self.private_key()),
            key_type: self.kind(),
            certificate,
            recipient_public_key_digest,
        }
    }

    /// Rebuild a record from its stored form, rejecting field combinations
    /// that do not belong to the stored type
    pub fn from_stored(stored: &StoredKeyRecord) -> KeyStoreResult<Self> {
        let private_key = Zeroizing::new(decode_base64("privateKey", &stored.private_key)?);

        match stored.key_type {
            KeyKind::Node => {
                reject_field(
                    stored.key_type,
                    "recipientPublicKeyDigest",
                    &stored.recipient_public_key_digest,
                )?;
                let certificate = stored.certificate.as_deref().ok_or_else(|| {
                    KeyStoreError::MalformedData("node key record has no certificate".to_string())
                })?;
                Ok(KeyRecord::Node {
                    private_key,
                    certificate: decode_base64("certificate", certificate)?,
                })
            }
            KeyKind::SessionInitial => {
                reject_field(stored.key_type, "certificate", &stored.certificate)?;
                reject_field(
                    stored.key_type,
                    "recipientPublicKeyDigest",
                    &stored.recipient_public_key_digest,
                )?;
                Ok(KeyRecord::InitialSession { private_key })
            }
            KeyKind::SessionSubsequent => {
                reject_field(stored.key_type, "certificate", &stored.certificate)?;
                let digest = stored.recipient_public_key_digest.as_deref().ok_or_else(|| {
                    KeyStoreError::MalformedData(
                        "bound session key record has no recipient digest".to_string(),
                    )
                })?;
                Ok(KeyRecord::SubsequentSession {
                    private_key,
                    peer_public_key_digest: PeerKeyDigest::from_hex(digest)?,
                })
            }
        }
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("KeyRecord");
        s.field("kind", &self.kind()).field("private_key", &"<redacted>");
        match self {
            KeyRecord::Node { certificate, .. } => {
                s.field("certificate_len", &certificate.len());
            }
            KeyRecord::InitialSession { .. } => {}
            KeyRecord::SubsequentSession {
                peer_public_key_digest,
                ..
            } => {
                s.field("peer_public_key_digest", peer_public_key_digest);
            }
        }
        s.finish()
    }
}

/// Flat record as written to and read from the KV engine
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredKeyRecord {
    pub private_key: String,
    #[serde(rename = "type")]
    pub key_type: KeyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_public_key_digest: Option<String>,
}

impl Drop for StoredKeyRecord {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl fmt::Debug for StoredKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredKeyRecord")
            .field("private_key", &"<redacted>")
            .field("key_type", &self.key_type)
            .field("certificate", &self.certificate)
            .field("recipient_public_key_digest", &self.recipient_public_key_digest)
            .finish()
    }
}

fn decode_base64(field: &str, value: &str) -> KeyStoreResult<Vec<u8>> {
    STANDARD
        .decode(value.as_bytes())
        .map_err(|e| KeyStoreError::MalformedData(format!("invalid base64 in {}: {}", field, e)))
}

fn reject_field(kind: KeyKind, field: &str, value: &Option<String>) -> KeyStoreResult<()> {
    if value.is_some() {
        return Err(KeyStoreError::MalformedData(format!(
            "{} key record must not carry {}",
            kind, field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn digest() -> PeerKeyDigest {
        PeerKeyDigest::of_der(b"peer public key")
    }

    #[test]
    fn test_key_kind_wire_names() {
        assert_eq!(serde_json::to_value(KeyKind::Node).unwrap(), json!("node"));
        assert_eq!(
            serde_json::to_value(KeyKind::SessionInitial).unwrap(),
            json!("session-initial")
        );
        assert_eq!(
            serde_json::to_value(KeyKind::SessionSubsequent).unwrap(),
            json!("session-subsequent")
        );
        assert_eq!("session-initial".parse::<KeyKind>().unwrap(), KeyKind::SessionInitial);
        assert!("bogus".parse::<KeyKind>().is_err());
    }

    #[test]
    fn test_node_record_carries_only_certificate() {
        let record = KeyRecord::Node {
            private_key: Zeroizing::new(vec![1, 2, 3]),
            certificate: vec![4, 5, 6],
        };

        let value = serde_json::to_value(record.to_stored()).unwrap();
        assert_eq!(
            value,
            json!({"privateKey": "AQID", "type": "node", "certificate": "BAUG"})
        );
    }

    #[test]
    fn test_initial_session_record_carries_no_metadata() {
        let record = KeyRecord::InitialSession {
            private_key: Zeroizing::new(vec![1, 2, 3]),
        };

        let value = serde_json::to_value(record.to_stored()).unwrap();
        assert_eq!(value, json!({"privateKey": "AQID", "type": "session-initial"}));
    }

    #[test]
    fn test_subsequent_session_record_carries_only_digest() {
        let record = KeyRecord::SubsequentSession {
            private_key: Zeroizing::new(vec![1, 2, 3]),
            peer_public_key_digest: digest(),
        };

        let value = serde_json::to_value(record.to_stored()).unwrap();
        assert_eq!(
            value,
            json!({
                "privateKey": "AQID",
                "type": "session-subsequent",
                "recipientPublicKeyDigest": digest().to_hex(),
            })
        );
    }

    #[test]
    fn test_stored_roundtrip_per_kind() {
        let records = vec![
            KeyRecord::Node {
                private_key: Zeroizing::new(vec![0xff; 48]),
                certificate: vec![0x00, 0x01, 0xfe],
            },
            KeyRecord::InitialSession {
                private_key: Zeroizing::new(vec![0x42; 48]),
            },
            KeyRecord::SubsequentSession {
                private_key: Zeroizing::new(vec![0x13; 48]),
                peer_public_key_digest: digest(),
            },
        ];

        for record in records {
            let restored = KeyRecord::from_stored(&record.to_stored()).unwrap();
            assert_eq!(restored, record);
        }
    }

    #[test]
    fn test_null_optional_fields_accepted() {
        let stored: StoredKeyRecord = serde_json::from_value(json!({
            "privateKey": "AQID",
            "type": "session-initial",
            "certificate": null,
            "recipientPublicKeyDigest": null,
        }))
        .unwrap();

        let record = KeyRecord::from_stored(&stored).unwrap();
        assert_eq!(record.kind(), KeyKind::SessionInitial);
    }

    #[test]
    fn test_node_record_without_certificate_rejected() {
        let stored: StoredKeyRecord =
            serde_json::from_value(json!({"privateKey": "AQID", "type": "node"})).unwrap();

        assert!(matches!(
            KeyRecord::from_stored(&stored),
            Err(KeyStoreError::MalformedData(_))
        ));
    }

    #[test]
    fn test_foreign_field_rejected() {
        let stored: StoredKeyRecord = serde_json::from_value(json!({
            "privateKey": "AQID",
            "type": "session-initial",
            "certificate": "BAUG",
        }))
        .unwrap();

        assert!(matches!(
            KeyRecord::from_stored(&stored),
            Err(KeyStoreError::MalformedData(_))
        ));
    }

    #[test]
    fn test_bad_encodings_rejected() {
        let bad_base64: StoredKeyRecord =
            serde_json::from_value(json!({"privateKey": "***", "type": "session-initial"}))
                .unwrap();
        assert!(KeyRecord::from_stored(&bad_base64).is_err());

        let short_digest: StoredKeyRecord = serde_json::from_value(json!({
            "privateKey": "AQID",
            "type": "session-subsequent",
            "recipientPublicKeyDigest": "abcd",
        }))
        .unwrap();
        assert!(matches!(
            KeyRecord::from_stored(&short_digest),
            Err(KeyStoreError::MalformedData(_))
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let record = KeyRecord::InitialSession {
            private_key: Zeroizing::new(vec![0xaa; 4]),
        };
        let debug = format!("{:?} {:?}", record, record.to_stored());
        assert!(!debug.contains("qqqqqg"));
        assert!(debug.contains("<redacted>"));
    }
}
