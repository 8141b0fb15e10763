//! Key material error types

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid key id: {0}")]
    InvalidKeyId(String),

    #[error("Invalid key encoding: {0}")]
    Encoding(String),

    #[error("Unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    #[error("Certificate expired")]
    CertificateExpired,

    #[error("Invalid certificate signature")]
    InvalidSignature,
}

pub(crate) fn encoding_error(err: impl fmt::Display) -> KeyError {
    KeyError::Encoding(err.to_string())
}
