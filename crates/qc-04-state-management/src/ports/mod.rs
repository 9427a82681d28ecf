//! # Ports Layer
//!
//! - **Driven Port (Outbound)**: `RegisterStore`, the narrow read/write-by-address
//!   contract the operation layer consumes
//! - No concrete implementations in this module

pub mod store;

pub use store::*;
