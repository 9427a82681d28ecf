//! # Domain Layer (Inner Hexagon)
//!
//! Operation semantics, flags, the register stream and the transaction that
//! carries it. No store access.

pub mod catalog;
pub mod flags;
pub mod stream;
pub mod transaction;

pub use catalog::*;
pub use flags::*;
pub use stream::*;
pub use transaction::*;
