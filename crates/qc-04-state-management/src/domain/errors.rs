use super::RegisterKind;
use shared_types::Address;
use thiserror::Error;

/// Errors raised by the register state model and its canonical codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Unknown register kind tag: 0x{0:02x}")]
    UnknownKind(u8),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Register kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: RegisterKind,
        actual: RegisterKind,
    },

    #[error("Invalid {kind} object: {reason}")]
    InvalidObject { kind: RegisterKind, reason: String },

    #[error("Register has no owner")]
    ZeroOwner,
}

impl From<bincode::Error> for StateError {
    fn from(err: bincode::Error) -> Self {
        StateError::Codec(err.to_string())
    }
}

/// Errors raised by register store adapters.
///
/// Store failures are never retried by the operation layer; they reject the
/// enclosing operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store backend error: {message}")]
    Backend { message: String },

    #[error("Stored register {address:?} is corrupted: {reason}")]
    Corrupted { address: Address, reason: String },

    #[error("Store unavailable")]
    Unavailable,
}
