//! Grindstone Domain Library
//!
//! Core domain types and interfaces for the Grindstone progression engine:
//! experience and levels, titles, gold, ambient and campaign bosses, quests,
//! and the item economy.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (UserBalance, BossEncounter, Quest, Item, ...)
//!   - `value_objects/`: Closed tag types (XpReason, ItemEffect, Rarity, QuestSelector)
//!   - `services/`: Pure rules (level curve, achievement evaluator, quest drafting)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Ledger store unit of work and its per-concern traits
//!   - `services/`: Randomness, clock, event delivery, identity
//!
//! # Usage
//!
//! ```rust,ignore
//! use grindstone::domain::{level_for_experience, UserBalance};
//! use grindstone::ports::{LedgerStore, LedgerTx};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    evaluate_achievements, level_for_experience, level_progress_percent, threshold_for_level,
    AchievementDefinition, ActiveBuff, BossEncounter, BossTemplate, CampaignBoss,
    CampaignProgress, DomainError, EncounterState, EngineEvent, EventEnvelope, InventoryEntry,
    Item, ItemCategory, ItemEffect, MetricScore, PassiveStack, Quest, QuestSelector,
    QuestStatus, Rarity, SmugglerEvent, SmugglerOffer, SpawnCondition, UnlockCondition,
    UserBalance, UserStats, XpReason, XpTransaction, ACHIEVEMENTS, MAX_LEVEL,
};
pub use ports::{
    // Repositories
    ActivityRepository,
    BalanceRepository,
    BossRepository,
    CampaignRepository,
    // Services
    Clock,
    EventPublisher,
    IdentityResolver,
    LedgerStore,
    LedgerTx,
    QuestRepository,
    RandomSource,
    ShopRepository,
};
