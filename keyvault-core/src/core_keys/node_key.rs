//! Node identity key
//!
//! Long-term Ed25519 signing key of a node. Serialized as PKCS#8 DER so the
//! stored form is the same one other tooling understands.
//!
//! Security: the signing key is zeroized on drop (ed25519-dalek `zeroize`
//! feature) and DER output is wrapped in `Zeroizing`.

use super::errors::{encoding_error, KeyError};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Ed25519 private key identifying a node
#[derive(Clone)]
pub struct NodePrivateKey {
    signing_key: SigningKey,
}

impl NodePrivateKey {
    /// Generate a new random node key
    pub fn generate() -> Self {
        let mut seed: [u8; 32] = rand::random();
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();

        NodePrivateKey { signing_key }
    }

    /// Build a node key from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        NodePrivateKey {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// PKCS#8 DER encoding of the private key
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        let document = self.signing_key.to_pkcs8_der().map_err(encoding_error)?;
        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    /// Parse a PKCS#8 DER encoded Ed25519 private key
    pub fn from_der(der: &[u8]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_pkcs8_der(der).map_err(encoding_error)?;
        Ok(NodePrivateKey { signing_key })
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn sign(&self, msg: &[u8]) -> Signature {
        self.signing_key.sign(msg)
    }
}

impl fmt::Debug for NodePrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePrivateKey")
            .field("public", &hex::encode(self.public_key().as_bytes()))
            .field("secret", &"<redacted>")
            .finish()
    }
}
