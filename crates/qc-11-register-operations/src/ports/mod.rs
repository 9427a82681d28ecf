//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Port (Inbound)**: `RegisterOperationsApi`
//! - **Driven Port (Outbound)**: `RegisterStore`, owned by the state
//!   management subsystem and re-exported here

pub mod inbound;

pub use inbound::*;
pub use qc_04_state_management::RegisterStore;
