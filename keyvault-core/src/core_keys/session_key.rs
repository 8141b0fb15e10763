//! Session key
//!
//! X25519 key-agreement key. A session key is first stored unbound
//! ("initial") and, once a correspondent uses it, re-stored bound to that
//! correspondent's identity key.
//!
//! DER form is a PKCS#8 `PrivateKeyInfo` with the id-X25519 algorithm and a
//! `CurvePrivateKey` OCTET STRING, as laid out in RFC 8410.

use super::errors::{encoding_error, KeyError};
use pkcs8::der::asn1::OctetStringRef;
use pkcs8::der::{Decode, Encode};
use pkcs8::{AlgorithmIdentifierRef, ObjectIdentifier, PrivateKeyInfo};
use std::fmt;
use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

/// id-X25519
pub const X25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.110");

/// X25519 private key for session key agreement
#[derive(Clone)]
pub struct SessionPrivateKey {
    secret: StaticSecret,
}

impl SessionPrivateKey {
    /// Generate a new random session key
    pub fn generate() -> Self {
        let mut bytes: [u8; 32] = rand::random();
        let secret = StaticSecret::from(bytes);
        bytes.zeroize();

        SessionPrivateKey { secret }
    }

    /// PKCS#8 DER encoding of the private key
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        let secret = Zeroizing::new(self.secret.to_bytes());
        let curve_private_key = Zeroizing::new(
            OctetStringRef::new(&secret[..])
                .and_then(|octets| octets.to_der())
                .map_err(encoding_error)?,
        );

        let info = PrivateKeyInfo::new(
            AlgorithmIdentifierRef {
                oid: X25519_OID,
                parameters: None,
            },
            curve_private_key.as_slice(),
        );

        info.to_der().map(Zeroizing::new).map_err(encoding_error)
    }

    /// Parse a PKCS#8 DER encoded X25519 private key
    pub fn from_der(der: &[u8]) -> Result<Self, KeyError> {
        let info = PrivateKeyInfo::try_from(der).map_err(encoding_error)?;
        if info.algorithm.oid != X25519_OID {
            return Err(KeyError::UnsupportedAlgorithm(info.algorithm.oid.to_string()));
        }

        let octets = OctetStringRef::from_der(info.private_key).map_err(encoding_error)?;
        let mut bytes: [u8; 32] = octets.as_bytes().try_into().map_err(|_| {
            KeyError::Encoding("X25519 private key must be 32 bytes".to_string())
        })?;
        let secret = StaticSecret::from(bytes);
        bytes.zeroize();

        Ok(SessionPrivateKey { secret })
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(&self.secret)
    }

    /// X25519 key agreement with a correspondent's session public key
    pub fn diffie_hellman(&self, their_public: &PublicKey) -> SharedSecret {
        self.secret.diffie_hellman(their_public)
    }
}

impl fmt::Debug for SessionPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPrivateKey")
            .field("public", &hex::encode(self.public_key().as_bytes()))
            .field("secret", &"<redacted>")
            .finish()
    }
}
