//! # Register State
//!
//! The durable content of one ledger register and its checksum.
//!
//! ## Canonical Serialization
//!
//! Fields are encoded in fixed order: `owner` (32 bytes), `kind` (u8),
//! `timestamp` (u64 LE), `data` (u64 LE length + bytes). The post-state
//! checksum is `hash` over exactly these bytes, so the encoding must never
//! change shape.
//!
//! ## Invariant
//!
//! A state read from a store is always the result of a previously committed,
//! checksum-verified transition. It is never partially written.

use super::{codec, RegisterObject, StateError};
use serde::{Deserialize, Serialize};
use shared_crypto::{hash, Digest};
use shared_types::{Address, AddressKind, Timestamp};
use std::fmt;

// =============================================================================
// REGISTER KIND
// =============================================================================

/// Register type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum RegisterKind {
    Raw = 0x01,
    Account = 0x02,
    Token = 0x03,
    Trust = 0x04,
}

impl RegisterKind {
    /// Address category a register of this kind must live under.
    pub fn address_kind(self) -> AddressKind {
        match self {
            RegisterKind::Raw => AddressKind::Raw,
            RegisterKind::Account => AddressKind::Account,
            RegisterKind::Token => AddressKind::Token,
            RegisterKind::Trust => AddressKind::Trust,
        }
    }

    /// True if `address` is tagged for this kind.
    pub fn matches_address(self, address: &Address) -> bool {
        address.kind() == self.address_kind()
    }
}

impl From<RegisterKind> for u8 {
    fn from(kind: RegisterKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for RegisterKind {
    type Error = StateError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0x01 => Ok(RegisterKind::Raw),
            0x02 => Ok(RegisterKind::Account),
            0x03 => Ok(RegisterKind::Token),
            0x04 => Ok(RegisterKind::Trust),
            other => Err(StateError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegisterKind::Raw => "RAW",
            RegisterKind::Account => "ACCOUNT",
            RegisterKind::Token => "TOKEN",
            RegisterKind::Trust => "TRUST",
        };
        f.write_str(name)
    }
}

// =============================================================================
// REGISTER STATE
// =============================================================================

/// Durable content of one ledger register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterState {
    /// Identity authorized to mutate this register.
    pub owner: Address,
    pub kind: RegisterKind,
    /// Last-mutation time, stamped by the controller on every transition.
    pub timestamp: Timestamp,
    /// Opaque payload, interpreted through [`RegisterObject`].
    pub data: Vec<u8>,
}

impl RegisterState {
    /// Build a state from a typed object.
    pub fn new(
        owner: Address,
        timestamp: Timestamp,
        object: &RegisterObject,
    ) -> Result<Self, StateError> {
        Ok(Self {
            owner,
            kind: object.kind(),
            timestamp,
            data: object.encode()?,
        })
    }

    /// An empty state of `kind` owned by `owner`, the starting point for
    /// register creation.
    pub fn empty(owner: Address, kind: RegisterKind) -> Self {
        Self {
            owner,
            kind,
            timestamp: 0,
            data: Vec::new(),
        }
    }

    /// Decode the typed view of `data`.
    pub fn object(&self) -> Result<RegisterObject, StateError> {
        RegisterObject::decode(self.kind, &self.data)
    }

    /// Replace `data` with the encoding of `object`.
    ///
    /// The object must be of this register's kind.
    pub fn set_object(&mut self, object: &RegisterObject) -> Result<(), StateError> {
        if object.kind() != self.kind {
            return Err(StateError::KindMismatch {
                expected: self.kind,
                actual: object.kind(),
            });
        }
        self.data = object.encode()?;
        Ok(())
    }

    /// Drop the payload ahead of re-serializing a mutated view.
    pub fn clear_state(&mut self) {
        self.data.clear();
    }

    /// Full validity check: owner set, payload decodes as its kind and
    /// satisfies the kind's shape constraints.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.owner.is_zero() {
            return Err(StateError::ZeroOwner);
        }
        self.object()?.validate()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Canonical serialization.
    pub fn encode(&self) -> Result<Vec<u8>, StateError> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StateError> {
        codec::decode(bytes)
    }

    /// `hash` of the canonical serialization.
    pub fn checksum(&self) -> Result<Digest, StateError> {
        Ok(hash(&self.encode()?))
    }
}

// =============================================================================
// TESTS
// =============================================================================
