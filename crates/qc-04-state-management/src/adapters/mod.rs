//! # Adapters Layer
//!
//! Implementations of the `RegisterStore` port.

pub mod memory_store;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use memory_store::*;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::*;
