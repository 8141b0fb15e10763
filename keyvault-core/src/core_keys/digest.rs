//! Peer-binding digest
//!
//! SHA-256 over the SubjectPublicKeyInfo DER encoding of a peer's Ed25519
//! public key. A session key stored with this digest may only be released
//! for the same peer.

use super::errors::{encoding_error, KeyError};
use ed25519_dalek::VerifyingKey;
use pkcs8::EncodePublicKey;
use sha2::{Digest, Sha256};
use std::fmt;

const DIGEST_LEN: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerKeyDigest([u8; DIGEST_LEN]);

impl PeerKeyDigest {
    pub const LEN: usize = DIGEST_LEN;

    /// Digest of a peer's public key
    pub fn of(peer: &VerifyingKey) -> Result<Self, KeyError> {
        let der = peer.to_public_key_der().map_err(encoding_error)?;
        Ok(Self::of_der(der.as_bytes()))
    }

    /// Digest of an already DER-encoded public key
    pub fn of_der(public_key_der: &[u8]) -> Self {
        let hash = Sha256::digest(public_key_der);
        let mut out = [0u8; Self::LEN];
        out.copy_from_slice(&hash);
        PeerKeyDigest(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let digest: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            KeyError::Encoding(format!(
                "peer key digest must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(PeerKeyDigest(digest))
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(encoding_error)?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PeerKeyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerKeyDigest({})", self.to_hex())
    }
}
