//! Key store error types

use super::record::KeyKind;
use crate::core_keys::{KeyError, KeyId};
use std::fmt;
use thiserror::Error;

/// Backend operation a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Retrieve,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Save => "save",
            Operation::Retrieve => "retrieve",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors surfaced by the key store. A missing key is not an error (`Ok(None)`).
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// Connection, DNS or timeout failure. Carries only the sanitized message.
    #[error("Failed to {operation} key: {message}")]
    Transport { operation: Operation, message: String },

    #[error("Failed to {operation} key: Vault returned a {status} response")]
    BackendRejected { operation: Operation, status: u16 },

    #[error("Key {key_id} is not a {expected} key (stored as {actual})")]
    TypeMismatch {
        key_id: KeyId,
        expected: &'static str,
        actual: KeyKind,
    },

    #[error("Key {key_id} is bound to another recipient")]
    BindingMismatch { key_id: KeyId },

    #[error("Malformed key data: {0}")]
    MalformedData(String),

    #[error("Invalid key id: {0}")]
    InvalidKeyId(String),

    #[error("Invalid key store configuration: {0}")]
    Configuration(String),
}

impl From<KeyError> for KeyStoreError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidKeyId(msg) => KeyStoreError::InvalidKeyId(msg),
            other => KeyStoreError::MalformedData(other.to_string()),
        }
    }
}

pub type KeyStoreResult<T> = Result<T, KeyStoreError>;
