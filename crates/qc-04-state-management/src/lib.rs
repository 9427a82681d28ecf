//! # qc-04-state-management
//!
//! Register state subsystem for Quantum-Chain.
//!
//! ## Role in System
//!
//! - **Register State Model**: `RegisterState` and its typed views
//!   (Account, Token, Trust, Raw)
//! - **Canonical Codec**: one encoding per value, the input to every checksum
//! - **Register Store**: the read/write-by-address port and its in-memory and
//!   RocksDB adapters
//! - **Leases**: per-register exclusivity for committing operations
//!
//! ## Consumers
//!
//! ```text
//! [Register Operations (11)] ──read/write──→ [RegisterStore]
//!            │                                     │
//!            └── checksum(RegisterState) ──→ [shared-crypto::hash]
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
