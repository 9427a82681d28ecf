//! # Typed Register Objects
//!
//! Views over a register's opaque `data` payload. Each view has a single
//! fixed-width canonical encoding, except `Raw` which is a bounded byte
//! vector.
//!
//! | Kind | Fields | Encoded size |
//! |------|--------|--------------|
//! | Account | token, balance | 40 bytes |
//! | Trust | token, balance, trust, stake | 56 bytes |
//! | Token | supply, balance, decimals | 17 bytes |
//! | Raw | bytes | 8 + len (len <= 1024) |

use super::{codec, RegisterKind, StateError};
use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Maximum payload of a raw register.
pub const MAX_RAW_DATA: usize = 1024;

/// Maximum decimal places a token may declare.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Balance-holding account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    /// Token register this account holds (zero for the native coin).
    pub token: Address,
    /// Spendable balance in base units.
    pub balance: u64,
}

/// Trust (staking) account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trust {
    pub token: Address,
    /// Spendable balance in base units.
    pub balance: u64,
    /// Accumulated trust score.
    pub trust: u64,
    /// Locked stake.
    pub stake: u64,
}

/// Token definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Token {
    /// Total supply ever minted.
    pub supply: u64,
    /// Unissued reserve still held by the token register.
    pub balance: u64,
    pub decimals: u8,
}

/// A decoded register payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterObject {
    Raw(Vec<u8>),
    Account(Account),
    Token(Token),
    Trust(Trust),
}

impl RegisterObject {
    /// Decode `data` as the view named by `kind`.
    pub fn decode(kind: RegisterKind, data: &[u8]) -> Result<Self, StateError> {
        let object = match kind {
            RegisterKind::Raw => RegisterObject::Raw(data.to_vec()),
            RegisterKind::Account => RegisterObject::Account(codec::decode(data)?),
            RegisterKind::Token => RegisterObject::Token(codec::decode(data)?),
            RegisterKind::Trust => RegisterObject::Trust(codec::decode(data)?),
        };
        Ok(object)
    }

    /// Canonical payload bytes.
    pub fn encode(&self) -> Result<Vec<u8>, StateError> {
        match self {
            RegisterObject::Raw(bytes) => Ok(bytes.clone()),
            RegisterObject::Account(account) => codec::encode(account),
            RegisterObject::Token(token) => codec::encode(token),
            RegisterObject::Trust(trust) => codec::encode(trust),
        }
    }

    pub fn kind(&self) -> RegisterKind {
        match self {
            RegisterObject::Raw(_) => RegisterKind::Raw,
            RegisterObject::Account(_) => RegisterKind::Account,
            RegisterObject::Token(_) => RegisterKind::Token,
            RegisterObject::Trust(_) => RegisterKind::Trust,
        }
    }

    /// Spendable balance, for kinds that carry one.
    pub fn balance(&self) -> Option<u64> {
        match self {
            RegisterObject::Raw(_) => None,
            RegisterObject::Account(account) => Some(account.balance),
            RegisterObject::Token(token) => Some(token.balance),
            RegisterObject::Trust(trust) => Some(trust.balance),
        }
    }

    /// Kind-specific shape constraints beyond decodability.
    pub fn validate(&self) -> Result<(), StateError> {
        match self {
            RegisterObject::Raw(bytes) if bytes.len() > MAX_RAW_DATA => {
                Err(StateError::InvalidObject {
                    kind: RegisterKind::Raw,
                    reason: format!("{} bytes exceeds {MAX_RAW_DATA}", bytes.len()),
                })
            }
            RegisterObject::Token(token) if token.balance > token.supply => {
                Err(StateError::InvalidObject {
                    kind: RegisterKind::Token,
                    reason: format!(
                        "reserve {} exceeds supply {}",
                        token.balance, token.supply
                    ),
                })
            }
            RegisterObject::Token(token) if token.decimals > MAX_TOKEN_DECIMALS => {
                Err(StateError::InvalidObject {
                    kind: RegisterKind::Token,
                    reason: format!("{} decimals exceeds {MAX_TOKEN_DECIMALS}", token.decimals),
                })
            }
            _ => Ok(()),
        }
    }
}

impl From<Account> for RegisterObject {
    fn from(account: Account) -> Self {
        RegisterObject::Account(account)
    }
}

impl From<Token> for RegisterObject {
    fn from(token: Token) -> Self {
        RegisterObject::Token(token)
    }
}

impl From<Trust> for RegisterObject {
    fn from(trust: Trust) -> Self {
        RegisterObject::Trust(trust)
    }
}
