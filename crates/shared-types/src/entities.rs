//! # Core Ledger Entities
//!
//! - **Address**: 256-bit register identifier with a category tag
//! - **AddressKind**: store-free classification of an address
//! - **Timestamp**: seconds since UNIX epoch

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix timestamp (seconds) carried by transactions and register states.
pub type Timestamp = u64;

// =============================================================================
// ADDRESS KIND
// =============================================================================

/// Register category encoded in the leading byte of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Opaque byte register.
    Raw,
    /// Balance-holding account register.
    Account,
    /// Token definition register.
    Token,
    /// Trust (staking) register.
    Trust,
    /// Leading byte is not a known register tag.
    Unknown,
}

impl AddressKind {
    /// Tag byte for raw registers.
    pub const RAW_TAG: u8 = 0xC3;
    /// Tag byte for account registers.
    pub const ACCOUNT_TAG: u8 = 0xC5;
    /// Tag byte for token registers.
    pub const TOKEN_TAG: u8 = 0xC6;
    /// Tag byte for trust registers.
    pub const TRUST_TAG: u8 = 0xC7;

    /// Classify a tag byte.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Self {
        match tag {
            Self::RAW_TAG => Self::Raw,
            Self::ACCOUNT_TAG => Self::Account,
            Self::TOKEN_TAG => Self::Token,
            Self::TRUST_TAG => Self::Trust,
            _ => Self::Unknown,
        }
    }

    /// Tag byte for this kind, `None` for [`AddressKind::Unknown`].
    #[must_use]
    pub const fn tag(self) -> Option<u8> {
        match self {
            Self::Raw => Some(Self::RAW_TAG),
            Self::Account => Some(Self::ACCOUNT_TAG),
            Self::Token => Some(Self::TOKEN_TAG),
            Self::Trust => Some(Self::TRUST_TAG),
            Self::Unknown => None,
        }
    }
}

// =============================================================================
// ADDRESS (32 bytes)
// =============================================================================

/// A 256-bit register address.
///
/// Stable for the register's lifetime. The leading byte is a category tag
/// (see [`AddressKind`]); the remaining 31 bytes identify the register.
/// Owner identities use the same type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The zero address. Never a valid register owner.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates an address from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates a tagged address: `kind`'s tag followed by the last 31 bytes
    /// of `body`.
    ///
    /// Returns `None` for [`AddressKind::Unknown`].
    #[must_use]
    pub fn tagged(kind: AddressKind, body: [u8; 32]) -> Option<Self> {
        let tag = kind.tag()?;
        let mut bytes = body;
        bytes[0] = tag;
        Some(Self(bytes))
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 32] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Parses a 64-character hex string, with or without `0x` prefix.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).ok()?;
        Self::from_slice(&bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Register category named by the leading tag byte.
    #[must_use]
    pub const fn kind(&self) -> AddressKind {
        AddressKind::from_tag(self.0[0])
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}...{}",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[30..])
        )
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 32] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
