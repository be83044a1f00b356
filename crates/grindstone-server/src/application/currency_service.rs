//! Currency Application Service
//!
//! Gold only moves through guarded conditional updates, so a balance can
//! never go negative regardless of how calls interleave.

use std::sync::Arc;

use uuid::Uuid;

use grindstone::{BalanceRepository, DomainError, LedgerStore, LedgerTx};

use super::EngineContext;

pub(crate) async fn credit_gold_in(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    amount: i64,
) -> Result<i64, DomainError> {
    tx.credit_gold(user_id, amount)
        .await?
        .ok_or_else(|| DomainError::not_found("User", user_id))
}

/// Debit gold, telling a missing user apart from an empty purse
pub(crate) async fn debit_gold_in(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    amount: i64,
) -> Result<i64, DomainError> {
    if let Some(gold) = tx.debit_gold(user_id, amount).await? {
        return Ok(gold);
    }

    match tx.find_balance(user_id).await? {
        Some(balance) => Err(DomainError::InsufficientFunds {
            required: amount,
            available: balance.gold,
        }),
        None => Err(DomainError::not_found("User", user_id)),
    }
}

pub struct CurrencyService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> CurrencyService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    /// Returns the new gold balance
    pub async fn award_gold(&self, user_id: Uuid, amount: i64) -> Result<i64, DomainError> {
        DomainError::require_positive("amount", amount)?;

        let mut tx = self.ctx.begin().await?;
        let gold = credit_gold_in(tx.as_mut(), user_id, amount).await?;
        tx.commit().await?;

        tracing::info!("💰 {} +{} gold (now {})", user_id, amount, gold);
        Ok(gold)
    }

    /// Returns the new gold balance
    pub async fn deduct_gold(&self, user_id: Uuid, amount: i64) -> Result<i64, DomainError> {
        DomainError::require_positive("amount", amount)?;

        let mut tx = self.ctx.begin().await?;
        let gold = debit_gold_in(tx.as_mut(), user_id, amount).await?;
        tx.commit().await?;

        tracing::info!("💸 {} -{} gold (now {})", user_id, amount, gold);
        Ok(gold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::TestEngine;

    #[tokio::test]
    async fn test_award_and_deduct() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 150).await;
        let gold = CurrencyService::new(engine.ctx());

        assert_eq!(gold.award_gold(user, 50).await.unwrap(), 200);
        assert_eq!(gold.deduct_gold(user, 200).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_funds_leaves_balance() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 150).await;
        let gold = CurrencyService::new(engine.ctx());

        let err = gold.deduct_gold(user, 200).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientFunds {
                required: 200,
                available: 150
            }
        ));
        assert_eq!(engine.balance(user).await.gold, 150);
    }

    #[tokio::test]
    async fn test_unknown_user_and_bad_amounts() {
        let engine = TestEngine::new();
        let gold = CurrencyService::new(engine.ctx());

        assert!(matches!(
            gold.deduct_gold(Uuid::new_v4(), 5).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            gold.award_gold(Uuid::new_v4(), 5).await,
            Err(DomainError::NotFound { .. })
        ));

        let user = engine.user_with(0, 10).await;
        assert!(matches!(
            gold.award_gold(user, -3).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            gold.deduct_gold(user, 0).await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_overdraw() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 100).await;
        let gold = Arc::new(CurrencyService::new(engine.ctx()));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let gold = gold.clone();
                tokio::spawn(async move { gold.deduct_gold(user, 30).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(engine.balance(user).await.gold, 10);
    }
}
