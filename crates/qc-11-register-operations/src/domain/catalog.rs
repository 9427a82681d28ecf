//! # Operation Catalog
//!
//! Business logic for each register operation. Every function here is pure:
//! it takes the decoded pre-state view and the operation parameters and
//! returns the mutated view. Reading the pre-state, stamping the timestamp,
//! checksumming and committing belong to the controller and are written
//! once for all operations.
//!
//! | Operation | Register kind | Effect |
//! |-----------|---------------|--------|
//! | Debit | ACCOUNT | `balance -= amount`, never below zero |
//! | Credit | ACCOUNT | `balance += amount`, never overflows |
//! | Transfer | any | `owner = to` |
//! | Authorize | any | none beyond the timestamp |
//! | Create | chosen | register initialised from the supplied payload |
//!
//! A Credit only reaches here once the controller has matched it to the
//! Debit that funds it.

use crate::errors::OperationError;
use qc_04_state_management::{RegisterKind, RegisterObject, RegisterState};
use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Closed set of register operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Debit,
    Credit,
    Transfer,
    Authorize,
    Create {
        register: RegisterKind,
        /// Canonical payload of the new register's object.
        payload: Vec<u8>,
    },
}

/// Parameters every operation receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationParams {
    /// Register being mutated.
    pub from: Address,
    /// Counterparty: debit/credit peer, or the new owner for a transfer.
    pub to: Address,
    pub amount: u64,
}

/// Decoded register content an operation works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterView {
    pub owner: Address,
    pub object: RegisterObject,
}

impl RegisterView {
    fn decode(state: &RegisterState, address: Address) -> Result<Self, OperationError> {
        let object = state
            .object()
            .map_err(|e| OperationError::malformed(address, &e))?;
        Ok(Self {
            owner: state.owner,
            object,
        })
    }
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Debit => "debit",
            OperationKind::Credit => "credit",
            OperationKind::Transfer => "transfer",
            OperationKind::Authorize => "authorize",
            OperationKind::Create { .. } => "create",
        }
    }

    /// Register kind the pre-state must have, `None` for any.
    pub fn expected_kind(&self) -> Option<RegisterKind> {
        match self {
            OperationKind::Debit | OperationKind::Credit => Some(RegisterKind::Account),
            OperationKind::Create { register, .. } => Some(*register),
            OperationKind::Transfer | OperationKind::Authorize => None,
        }
    }

    /// True for the one operation whose pre-state is synthesized rather than
    /// read.
    pub fn creates_register(&self) -> bool {
        matches!(self, OperationKind::Create { .. })
    }

    /// Run the business logic against `pre`.
    pub fn apply(
        &self,
        pre: &RegisterState,
        params: &OperationParams,
    ) -> Result<RegisterView, OperationError> {
        let view = || RegisterView::decode(pre, params.from);
        match self {
            OperationKind::Debit => debit(view()?, params),
            OperationKind::Credit => credit(view()?, params),
            OperationKind::Transfer => transfer(view()?, params),
            OperationKind::Authorize => view(),
            OperationKind::Create { register, payload } => create(pre, *register, payload, params),
        }
    }
}

fn debit(mut view: RegisterView, params: &OperationParams) -> Result<RegisterView, OperationError> {
    let actual = view.object.kind();
    let RegisterObject::Account(account) = &mut view.object else {
        return Err(wrong_object(params, RegisterKind::Account, actual));
    };
    if params.amount > account.balance {
        return Err(OperationError::InsufficientFunds {
            address: params.from,
            required: params.amount,
            available: account.balance,
        });
    }
    account.balance -= params.amount;
    Ok(view)
}

fn credit(mut view: RegisterView, params: &OperationParams) -> Result<RegisterView, OperationError> {
    let actual = view.object.kind();
    let RegisterObject::Account(account) = &mut view.object else {
        return Err(wrong_object(params, RegisterKind::Account, actual));
    };
    account.balance = account
        .balance
        .checked_add(params.amount)
        .ok_or(OperationError::BalanceOverflow {
            address: params.from,
            balance: account.balance,
            amount: params.amount,
        })?;
    Ok(view)
}

fn transfer(mut view: RegisterView, params: &OperationParams) -> Result<RegisterView, OperationError> {
    view.owner = params.to;
    Ok(view)
}

fn create(
    pre: &RegisterState,
    register: RegisterKind,
    payload: &[u8],
    params: &OperationParams,
) -> Result<RegisterView, OperationError> {
    let object = RegisterObject::decode(register, payload)
        .map_err(|e| OperationError::malformed(params.from, &e))?;
    Ok(RegisterView {
        owner: pre.owner,
        object,
    })
}

fn wrong_object(
    params: &OperationParams,
    expected: RegisterKind,
    actual: RegisterKind,
) -> OperationError {
    OperationError::WrongRegisterType {
        address: params.from,
        expected,
        actual,
    }
}
