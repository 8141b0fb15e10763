//! Node certificate
//!
//! Binds a serial number and an expiry to a node's Ed25519 public key, signed
//! by an issuer key (the node itself for self-issued certificates).
//!
//! Signed message: serial_number || subject_public_key || issuer_public_key || not_after (LE)

use super::errors::KeyError;
use super::key_id::KeyId;
use super::node_key::NodePrivateKey;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Length of randomly generated serial numbers
const SERIAL_NUMBER_LEN: usize = 16;

/// Identity certificate of a node
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCertificate {
    serial_number: KeyId,
    subject_public_key: VerifyingKey,
    issuer_public_key: VerifyingKey,
    /// Expiry, seconds since the Unix epoch
    not_after: u64,
    signature: Signature,
}

impl NodeCertificate {
    /// Issue a certificate with a random serial number
    pub fn issue(
        issuer: &NodePrivateKey,
        subject: &VerifyingKey,
        not_after: SystemTime,
    ) -> Result<Self, KeyError> {
        let serial: [u8; SERIAL_NUMBER_LEN] = rand::random();
        Self::issue_with_serial(issuer, subject, KeyId::new(serial.to_vec())?, not_after)
    }

    /// Issue a certificate with a caller-chosen serial number
    pub fn issue_with_serial(
        issuer: &NodePrivateKey,
        subject: &VerifyingKey,
        serial_number: KeyId,
        not_after: SystemTime,
    ) -> Result<Self, KeyError> {
        let not_after = not_after
            .duration_since(UNIX_EPOCH)
            .map_err(|_| KeyError::InvalidCertificate("expiry predates the epoch".to_string()))?
            .as_secs();
        let issuer_public_key = issuer.public_key();

        let msg = signed_message(&serial_number, subject, &issuer_public_key, not_after);
        let signature = issuer.sign(&msg);

        Ok(NodeCertificate {
            serial_number,
            subject_public_key: *subject,
            issuer_public_key,
            not_after,
            signature,
        })
    }

    /// Self-issued certificate for a node key
    pub fn self_issued(key: &NodePrivateKey, not_after: SystemTime) -> Result<Self, KeyError> {
        Self::issue(key, &key.public_key(), not_after)
    }

    /// Serial number, which doubles as the node key id
    pub fn serial_number(&self) -> &KeyId {
        &self.serial_number
    }

    pub fn subject_public_key(&self) -> &VerifyingKey {
        &self.subject_public_key
    }

    pub fn issuer_public_key(&self) -> &VerifyingKey {
        &self.issuer_public_key
    }

    pub fn not_after(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.not_after)
    }

    /// Binary encoding (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, KeyError> {
        bincode::serialize(self).map_err(|e| KeyError::InvalidCertificate(e.to_string()))
    }

    /// Decode a certificate produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let cert: NodeCertificate = bincode::deserialize(bytes)
            .map_err(|e| KeyError::InvalidCertificate(e.to_string()))?;
        if cert.serial_number.as_bytes().is_empty() {
            return Err(KeyError::InvalidCertificate("empty serial number".to_string()));
        }
        Ok(cert)
    }

    /// Check the issuer signature and that the certificate has not expired at `now`
    pub fn validate(&self, now: SystemTime) -> Result<(), KeyError> {
        let msg = signed_message(
            &self.serial_number,
            &self.subject_public_key,
            &self.issuer_public_key,
            self.not_after,
        );
        self.issuer_public_key
            .verify(&msg, &self.signature)
            .map_err(|_| KeyError::InvalidSignature)?;

        if now > self.not_after() {
            return Err(KeyError::CertificateExpired);
        }
        Ok(())
    }
}

impl fmt::Debug for NodeCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCertificate")
            .field("serial_number", &self.serial_number)
            .field("subject", &hex::encode(self.subject_public_key.as_bytes()))
            .field("issuer", &hex::encode(self.issuer_public_key.as_bytes()))
            .field("not_after", &self.not_after)
            .finish()
    }
}

fn signed_message(
    serial_number: &KeyId,
    subject: &VerifyingKey,
    issuer: &VerifyingKey,
    not_after: u64,
) -> Vec<u8> {
    let mut msg = Vec::new();
    msg.extend_from_slice(serial_number.as_bytes());
    msg.extend_from_slice(subject.as_bytes());
    msg.extend_from_slice(issuer.as_bytes());
    msg.extend_from_slice(&not_after.to_le_bytes());
    msg
}
