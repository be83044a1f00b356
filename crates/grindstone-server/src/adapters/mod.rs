//! Infrastructure Adapters
//!
//! Implementations of engine ports for external systems.

pub mod clock;
pub mod identity;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod random;
pub mod webhook;

// Re-exports
pub use clock::SystemClock;
pub use identity::HeaderIdentityResolver;
pub use postgres::PgLedgerStore;
pub use random::RngSource;
pub use webhook::{NoopPublisher, WebhookPublisher};
