//! # Transactions
//!
//! A transaction names its caller, its timestamp, the operations it performs
//! (in order) and the register stream that proves each transition.

use super::{OperationKind, OperationParams, OperationStream};
use qc_04_state_management::{codec, RegisterObject, StateError};
use serde::{Deserialize, Serialize};
use shared_crypto::{hash_in_context, Digest};
use shared_types::{Address, Timestamp};
use std::collections::BTreeSet;

/// Derive-key context for transaction ids.
const TRANSACTION_HASH_CONTEXT: &str = "quantum-chain register transaction v1";

/// One register operation inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    /// Register the operation mutates.
    pub from: Address,
    pub to: Address,
    pub amount: u64,
}

impl Operation {
    pub fn debit(from: Address, to: Address, amount: u64) -> Self {
        Self {
            kind: OperationKind::Debit,
            from,
            to,
            amount,
        }
    }

    /// Credit `amount` to `register`, naming the debited `source`.
    pub fn credit(register: Address, source: Address, amount: u64) -> Self {
        Self {
            kind: OperationKind::Credit,
            from: register,
            to: source,
            amount,
        }
    }

    pub fn transfer(register: Address, new_owner: Address) -> Self {
        Self {
            kind: OperationKind::Transfer,
            from: register,
            to: new_owner,
            amount: 0,
        }
    }

    pub fn authorize(register: Address) -> Self {
        Self {
            kind: OperationKind::Authorize,
            from: register,
            to: Address::ZERO,
            amount: 0,
        }
    }

    /// Create `register` holding `object`.
    pub fn create(register: Address, object: &RegisterObject) -> Result<Self, StateError> {
        Ok(Self {
            kind: OperationKind::Create {
                register: object.kind(),
                payload: object.encode()?,
            },
            from: register,
            to: Address::ZERO,
            amount: 0,
        })
    }

    pub fn params(&self) -> OperationParams {
        OperationParams {
            from: self.from,
            to: self.to,
            amount: self.amount,
        }
    }
}

/// A ledger transaction carrying register operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identity the operations run as.
    pub caller: Address,
    /// Stamped onto every post-state.
    pub timestamp: Timestamp,
    pub operations: Vec<Operation>,
    pub register_stream: OperationStream,
}

impl Transaction {
    pub fn new(caller: Address, timestamp: Timestamp) -> Self {
        Self {
            caller,
            timestamp,
            operations: Vec::new(),
            register_stream: OperationStream::new(),
        }
    }

    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Distinct registers the transaction mutates.
    pub fn registers(&self) -> BTreeSet<Address> {
        self.operations.iter().map(|op| op.from).collect()
    }

    /// Canonical wire encoding.
    pub fn encode(&self) -> Result<Vec<u8>, StateError> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StateError> {
        codec::decode(bytes)
    }

    /// Transaction id: domain-separated hash of the wire encoding.
    pub fn hash(&self) -> Result<Digest, StateError> {
        Ok(hash_in_context(TRANSACTION_HASH_CONTEXT, &self.encode()?))
    }
}
