//! # QC-11 Register Operations - Verified State Transitions
//!
//! **Subsystem ID:** 11
//!
//! ## Purpose
//!
//! Executes operations (Debit, Credit, Transfer, Authorize, Create) against
//! typed registers. One controller serves three roles selected by flags:
//!
//! - **Builder** reads each pre-state from the store and records it, with
//!   the post-state checksum, in the transaction's register stream.
//! - **Validator** re-executes from the stream, verifies every checksum and
//!   commits the post-states.
//! - **Mempool** re-executes and verifies exactly as the validator does,
//!   then stops short of writing.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Only the owner mutates a register | `controller.rs` - owner check |
//! | Post-states are valid before they are hashed | `controller.rs` - `validate()` |
//! | Validators reproduce the builder's checksum | `controller.rs` - POSTSTATE verify |
//! | MEMPOOL never writes | `controller.rs` - role dispatch |
//! | Embedded pre-states match the store | `controller.rs` - `ensure_fresh` |
//! | Every credit is funded by an earlier debit | `controller.rs` - `PendingStates::claim_debit` |
//! | Commits hold a lease on the register | `controller.rs` - `LeaseNotHeld` |
//!
//! ## Outbound Dependencies
//!
//! | Subsystem | Trait | Purpose |
//! |-----------|-------|---------|
//! | 4 (State Mgmt) | `RegisterStore` | Read/write register state |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_11_register_operations::prelude::*;
//!
//! let service = RegisterOperationService::new(store, ServiceConfig::from_env())?;
//! let mut tx = Transaction::new(caller, now).with_operation(Operation::debit(from, to, 30));
//!
//! service.build_transaction(&mut tx)?;   // block producer
//! service.check_transaction(&tx)?;       // mempool
//! service.commit_transaction(&tx)?;      // every validator
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod controller;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;
pub mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::{
        FlagBits, Flags, Marker, Operation, OperationKind, OperationParams, OperationStream,
        RegisterView, Role, Transaction,
    };

    // Controller
    pub use crate::controller::{ExecutionContext, PendingStates, RegisterController};

    // Ports
    pub use crate::ports::{RegisterOperationsApi, RegisterStore};

    // Errors
    pub use crate::errors::{
        ConfigError, ErrorKind, FlagError, OperationError, ServiceError, StreamError,
    };

    // Service
    pub use crate::service::{
        create_test_service, RegisterOperationService, ServiceConfig, ServiceStats,
    };

    // Logging
    pub use crate::telemetry::{init_logging, LoggingConfig, TelemetryError};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 11;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Register Operations";

// =============================================================================
// TESTS
// =============================================================================
