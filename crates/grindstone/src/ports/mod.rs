//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the engine interacts with
//! external systems (the ledger store, randomness, time, notifications,
//! identity).
//!
//! Implementations of these traits live in the infrastructure layer.

pub mod repositories;
pub mod services;

// Re-exports
pub use repositories::*;
pub use services::*;
