//! Key material module
//!
//! The cryptographic objects the key store persists:
//! - `NodePrivateKey` -> long-term Ed25519 identity key, PKCS#8 DER encoded
//! - `SessionPrivateKey` -> X25519 key-agreement key, PKCS#8 DER encoded (RFC 8410)
//! - `NodeCertificate` -> identity certificate binding a serial number to a node public key
//! - `PeerKeyDigest` -> SHA-256 of a peer's public key, used to bind session keys
//! - `KeyId` -> opaque, non-empty lookup handle

mod certificate;
mod digest;
mod errors;
mod key_id;
mod node_key;
mod session_key;

pub use certificate::NodeCertificate;
pub use digest::PeerKeyDigest;
pub use errors::KeyError;
pub use key_id::KeyId;
pub use node_key::NodePrivateKey;
pub use session_key::{SessionPrivateKey, X25519_OID};

/// Ed25519 public key of a peer node
pub use ed25519_dalek::VerifyingKey as NodePublicKey;
/// X25519 public key of a session key
pub use x25519_dalek::PublicKey as SessionPublicKey;
