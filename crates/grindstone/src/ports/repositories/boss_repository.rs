//! Boss Repository Port
//!
//! Ambient boss templates, encounters and the per-day penalty log.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{errors::DomainError, BossEncounter, BossTemplate};

#[async_trait]
pub trait BossRepository: Send {
    async fn boss_templates(&mut self) -> Result<Vec<BossTemplate>, DomainError>;

    async fn find_boss_template(&mut self, id: Uuid) -> Result<Option<BossTemplate>, DomainError>;

    /// The user's undefeated encounter, locked
    async fn lock_active_encounter(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<BossEncounter>, DomainError>;

    /// A specific encounter owned by the user, locked, in any state
    async fn lock_encounter(
        &mut self,
        user_id: Uuid,
        encounter_id: Uuid,
    ) -> Result<Option<BossEncounter>, DomainError>;

    async fn insert_encounter(&mut self, encounter: &BossEncounter) -> Result<(), DomainError>;

    /// Persist health and `defeated_at`
    async fn save_encounter(&mut self, encounter: &BossEncounter) -> Result<(), DomainError>;

    /// Insert `(encounter, date)` if absent. Returns false if that day was already claimed.
    async fn claim_penalty_day(
        &mut self,
        encounter_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, DomainError>;
}
