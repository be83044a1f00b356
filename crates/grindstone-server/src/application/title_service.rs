//! Title Application Service
//!
//! Titles are unlocked by the achievement evaluator during XP changes; this
//! service only lists them and equips one.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use grindstone::{BalanceRepository, DomainError, LedgerStore, UnlockCondition, ACHIEVEMENTS};

use super::EngineContext;

/// Catalog entry annotated for one user
#[derive(Debug, Clone, Serialize)]
pub struct TitleView {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlock_condition: UnlockCondition,
    pub unlocked: bool,
    pub equipped: bool,
}

pub struct TitleService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> TitleService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    /// Equip an owned title, or clear it with `None`
    pub async fn equip_title(
        &self,
        user_id: Uuid,
        achievement_id: Option<String>,
    ) -> Result<Option<String>, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let mut balance = tx
            .lock_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        if let Some(id) = &achievement_id {
            if !balance.has_title(id) {
                return Err(DomainError::Forbidden(format!("title {id} is not unlocked")));
            }
        }

        balance.active_title = achievement_id;
        balance.updated_at = self.ctx.now();
        tx.save_balance(&balance).await?;
        tx.commit().await?;

        Ok(balance.active_title)
    }

    /// The full catalog with unlocked and equipped flags
    pub async fn list_titles(&self, user_id: Uuid) -> Result<Vec<TitleView>, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let balance = tx
            .find_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        tx.commit().await?;

        Ok(ACHIEVEMENTS
            .iter()
            .map(|a| TitleView {
                id: a.id,
                title: a.title,
                description: a.description,
                icon: a.icon,
                unlock_condition: a.unlock_condition,
                unlocked: balance.has_title(a.id),
                equipped: balance.active_title.as_deref() == Some(a.id),
            })
            .collect())
    }
}
