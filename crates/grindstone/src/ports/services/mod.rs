//! Service Ports
//!
//! Abstract interfaces for collaborators outside the ledger store.

mod clock;
mod event_publisher;
mod identity;
mod random;

pub use clock::*;
pub use event_publisher::*;
pub use identity::*;
pub use random::*;
