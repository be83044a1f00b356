//! Balance Repository Port
//!
//! Experience, level, gold, titles and the XP audit log.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, UserBalance, XpTransaction};

#[async_trait]
pub trait BalanceRepository: Send {
    /// Read a balance without locking it
    async fn find_balance(&mut self, user_id: Uuid) -> Result<Option<UserBalance>, DomainError>;

    /// Read a balance and hold its row lock until the transaction ends
    async fn lock_balance(&mut self, user_id: Uuid) -> Result<Option<UserBalance>, DomainError>;

    /// Persist experience, level, titles and active title
    async fn save_balance(&mut self, balance: &UserBalance) -> Result<(), DomainError>;

    /// Append one audit row
    async fn insert_xp_transaction(&mut self, entry: &XpTransaction) -> Result<(), DomainError>;

    /// `gold = gold + amount`. Returns the new gold, or `None` if the user does not exist.
    async fn credit_gold(&mut self, user_id: Uuid, amount: i64)
        -> Result<Option<i64>, DomainError>;

    /// `gold = gold - amount WHERE gold >= amount`. Returns the new gold, or
    /// `None` if the guard failed or the user does not exist.
    async fn debit_gold(&mut self, user_id: Uuid, amount: i64) -> Result<Option<i64>, DomainError>;
}
