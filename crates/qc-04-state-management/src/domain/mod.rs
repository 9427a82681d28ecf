//! # Domain Layer
//!
//! Register state model: typed objects, canonical codec, checksums and
//! per-register leases. No store access.

pub mod codec;
pub mod errors;
pub mod lease;
pub mod objects;
pub mod state;

pub use errors::*;
pub use lease::*;
pub use objects::*;
pub use state::*;
