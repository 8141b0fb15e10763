//! Key identifier
//!
//! Opaque byte string used to look keys up. Session key ids are chosen by the
//! caller; node key ids are the serial number of the node certificate.

use super::errors::KeyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Non-empty key identifier, rendered as lowercase hex
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(Vec<u8>);

impl KeyId {
    /// Create a key id from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(KeyError::InvalidKeyId("key id must not be empty".to_string()));
        }
        Ok(KeyId(bytes))
    }

    /// Parse a hex-encoded key id (either case)
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|e| KeyError::InvalidKeyId(e.to_string()))?;
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form, as used in storage paths
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl FromStr for KeyId {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_key_id_rejected() {
        assert!(matches!(KeyId::new(Vec::new()), Err(KeyError::InvalidKeyId(_))));
        assert!(matches!(KeyId::from_hex(""), Err(KeyError::InvalidKeyId(_))));
    }

    #[test]
    fn test_hex_is_lowercase() {
        let id = KeyId::from_hex("AB01").unwrap();
        assert_eq!(id.as_bytes(), &[0xab, 0x01]);
        assert_eq!(id.to_hex(), "ab01");
        assert_eq!(id.to_string(), "ab01");
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(KeyId::from_hex("xyz").is_err());
        assert!("abc".parse::<KeyId>().is_err());
    }

    proptest! {
        #[test]
        fn prop_hex_roundtrip(bytes in prop::collection::vec(any::<u8>(), 1..64)) {
            let id = KeyId::new(bytes.clone()).unwrap();
            let parsed = KeyId::from_hex(&id.to_hex()).unwrap();
            prop_assert_eq!(parsed.as_bytes(), bytes.as_slice());
        }
    }
}
