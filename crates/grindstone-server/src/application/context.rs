//! Shared engine dependencies

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use grindstone::{
    Clock, DomainError, EngineEvent, EventPublisher, LedgerStore, LedgerTx, RandomSource,
    ShopRepository,
};

use crate::config::EngineConfig;

/// Everything an engine service needs besides its own logic
pub struct EngineContext<S: LedgerStore> {
    pub store: Arc<S>,
    pub random: Arc<dyn RandomSource>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn EventPublisher>,
    pub config: EngineConfig,
}

impl<S: LedgerStore> EngineContext<S> {
    pub fn new(
        store: Arc<S>,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventPublisher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            random,
            clock,
            events,
            config,
        }
    }

    pub async fn begin(&self) -> Result<Box<dyn LedgerTx>, DomainError> {
        self.store.begin().await
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn publish(&self, events: &[EngineEvent]) {
        self.events.publish_all(events).await;
    }

    /// Opportunistic cleanup in its own transaction. Safe to skip or repeat.
    pub async fn sweep_expired_buffs(&self, user_id: Uuid) {
        let now = self.now();
        let result = async {
            let mut tx = self.begin().await?;
            let removed = tx.delete_expired_buffs(user_id, now).await?;
            tx.commit().await?;
            Ok::<u64, DomainError>(removed)
        }
        .await;

        match result {
            Ok(0) => {}
            Ok(removed) => tracing::debug!("Swept {} expired buffs for {}", removed, user_id),
            Err(e) => tracing::warn!("Skipping buff sweep for {}: {}", user_id, e),
        }
    }
}
