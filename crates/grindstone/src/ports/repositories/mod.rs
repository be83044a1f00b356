//! Repository Ports
//!
//! The ledger store is reached through a unit of work: `LedgerStore::begin`
//! opens a `LedgerTx`, every read and write goes through it, and nothing is
//! visible to other callers until `commit`. Dropping an uncommitted
//! transaction rolls it back.
//!
//! Methods prefixed `lock_` take a row lock that is held until the
//! transaction ends. Methods returning `Option` from a write are guarded
//! conditional updates: `None` means the guard rejected the change.

use async_trait::async_trait;

use crate::domain::errors::DomainError;

mod activity_repository;
mod balance_repository;
mod boss_repository;
mod campaign_repository;
mod quest_repository;
mod shop_repository;

pub use activity_repository::*;
pub use balance_repository::*;
pub use boss_repository::*;
pub use campaign_repository::*;
pub use quest_repository::*;
pub use shop_repository::*;

/// Entry point to the ledger store
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a new all-or-nothing unit of work
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, DomainError>;
}

/// An open unit of work against the ledger store
#[async_trait]
pub trait LedgerTx:
    BalanceRepository
    + ActivityRepository
    + BossRepository
    + CampaignRepository
    + QuestRepository
    + ShopRepository
    + Send
{
    /// Make every change of this unit visible at once
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
