//! # Shared Types Crate
//!
//! Ledger primitives shared by the register state model
//! (`qc-04-state-management`) and the register operation layer
//! (`qc-11-register-operations`).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: register addresses are defined once, here.
//! - **Store-free classification**: an address names its register category
//!   through its leading tag byte, so no lookup is needed to classify it.

pub mod entities;

pub use entities::*;
