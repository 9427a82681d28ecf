//! # Error Types
//!
//! Every rejection is terminal for the operation that raised it and, through
//! the service, for the enclosing transaction. Nothing here is retried.
//! Variants carry structured context; the rendered message is presentation
//! only and [`OperationError::kind`] is what callers should compare.

use qc_04_state_management::{RegisterKind, StateError, StoreError};
use shared_crypto::Digest;
use shared_types::Address;
use thiserror::Error;

// =============================================================================
// STREAM ERRORS
// =============================================================================

/// Malformed operation stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Marker byte was not PRESTATE where a pre-state was required.
    #[error("register stream not in pre-state (found marker 0x{found:02x})")]
    ExpectedPrestate { found: u8 },

    /// Marker byte was not POSTSTATE where a checksum was required.
    #[error("register stream not in post-state (found marker 0x{found:02x})")]
    ExpectedPoststate { found: u8 },

    /// Marker byte is not a known marker.
    #[error("unknown stream marker 0x{0:02x}")]
    UnknownMarker(u8),

    /// Read past the end of the stream.
    #[error("unexpected end of register stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// Embedded register state failed to decode.
    #[error("malformed embedded register state: {0}")]
    MalformedState(String),

    /// Bytes left over after the last operation.
    #[error("{remaining} trailing bytes in register stream")]
    TrailingBytes { remaining: usize },
}

// =============================================================================
// FLAG ERRORS
// =============================================================================

/// Rejected flag combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("unknown flag bits 0x{0:02x}")]
    UnknownBits(u8),

    /// Only BUILD (PRESTATE|POSTSTATE), WRITE and MEMPOOL are supported.
    #[error("unsupported flag combination 0x{0:02x}")]
    UnsupportedCombination(u8),
}

// =============================================================================
// OPERATION ERRORS
// =============================================================================

/// Stable classification of an [`OperationError`], identical on every node
/// that replays the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RegisterNotFound,
    RegisterExists,
    StreamFormat,
    Unauthorized,
    WrongRegisterType,
    InsufficientFunds,
    BalanceOverflow,
    UnmatchedCredit,
    MalformedRegister,
    InvalidPostState,
    ChecksumMismatch,
    StalePrestate,
    LeaseNotHeld,
    Store,
}

/// Rejection of a single register operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("register address doesn't exist: {address:?}")]
    RegisterNotFound { address: Address },

    #[error("register address already exists: {address:?}")]
    RegisterExists { address: Address },

    #[error("stream format error: {0}")]
    StreamFormat(#[from] StreamError),

    #[error("{caller:?} not authorized to mutate {address:?} (owner {owner:?})")]
    Unauthorized {
        address: Address,
        owner: Address,
        caller: Address,
    },

    #[error("{address:?} is a {actual} register, expected {expected}")]
    WrongRegisterType {
        address: Address,
        expected: RegisterKind,
        actual: RegisterKind,
    },

    #[error("{address:?} is not tagged for a {kind} register")]
    AddressTagMismatch { address: Address, kind: RegisterKind },

    #[error("{address:?} has insufficient balance: required {required}, available {available}")]
    InsufficientFunds {
        address: Address,
        required: u64,
        available: u64,
    },

    #[error("crediting {amount} to {address:?} overflows balance {balance}")]
    BalanceOverflow {
        address: Address,
        balance: u64,
        amount: u64,
    },

    #[error("no debit of {amount} from {debited:?} to {address:?} precedes this credit")]
    UnmatchedCredit {
        address: Address,
        debited: Address,
        amount: u64,
    },

    #[error("register {address:?} payload is malformed: {reason}")]
    MalformedRegister { address: Address, reason: String },

    #[error("register {address:?} would be left in an invalid state: {reason}")]
    InvalidPostState { address: Address, reason: String },

    #[error("post-state checksum mismatch for {address:?}: stream {claimed}, computed {computed}")]
    ChecksumMismatch {
        address: Address,
        claimed: Digest,
        computed: Digest,
    },

    #[error("stored state of {address:?} no longer matches the embedded pre-state")]
    StalePrestate { address: Address },

    #[error("committing to {address:?} requires a register lease")]
    LeaseNotHeld { address: Address },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl OperationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RegisterNotFound { .. } => ErrorKind::RegisterNotFound,
            Self::RegisterExists { .. } => ErrorKind::RegisterExists,
            Self::StreamFormat(_) => ErrorKind::StreamFormat,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::WrongRegisterType { .. } | Self::AddressTagMismatch { .. } => {
                ErrorKind::WrongRegisterType
            }
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::BalanceOverflow { .. } => ErrorKind::BalanceOverflow,
            Self::UnmatchedCredit { .. } => ErrorKind::UnmatchedCredit,
            Self::MalformedRegister { .. } => ErrorKind::MalformedRegister,
            Self::InvalidPostState { .. } => ErrorKind::InvalidPostState,
            Self::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            Self::StalePrestate { .. } => ErrorKind::StalePrestate,
            Self::LeaseNotHeld { .. } => ErrorKind::LeaseNotHeld,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    pub(crate) fn malformed(address: Address, err: &StateError) -> Self {
        Self::MalformedRegister {
            address,
            reason: err.to_string(),
        }
    }

    pub(crate) fn invalid_post_state(address: Address, err: &StateError) -> Self {
        Self::InvalidPostState {
            address,
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// SERVICE ERRORS
// =============================================================================

/// Invalid service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}

/// Rejection of a whole transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("operation {index} rejected: {source}")]
    Operation {
        index: usize,
        #[source]
        source: OperationError,
    },

    #[error("transaction carries no operations")]
    EmptyTransaction,

    #[error("transaction carries {count} operations, limit is {max}")]
    TooManyOperations { count: usize, max: usize },

    #[error("register stream is {size} bytes, limit is {max}")]
    StreamTooLarge { size: usize, max: usize },

    #[error("transaction already carries a register stream")]
    StreamNotEmpty,

    #[error("stream format error: {0}")]
    Stream(#[from] StreamError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// Kind of the operation failure, if an operation caused the rejection.
    pub fn operation_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Operation { source, .. } => Some(source.kind()),
            Self::Stream(_) => Some(ErrorKind::StreamFormat),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
