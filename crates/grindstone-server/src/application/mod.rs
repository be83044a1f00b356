//! Application Layer (Use Cases)
//!
//! One service per engine component. Each public operation opens exactly one
//! ledger transaction, commits it once, and publishes its events afterwards.
//! The `*_in` helpers run inside a caller's transaction so that composite
//! actions (a boss defeat paying XP, a focus session hitting two bosses)
//! stay all-or-nothing.

mod ambient_boss_service;
mod campaign_service;
mod context;
mod currency_service;
mod focus_service;
mod quest_service;
mod shop_service;
mod title_service;
mod xp_service;

#[cfg(test)]
mod test_support;

pub use ambient_boss_service::{
    AmbientBossService, AmbientBossView, AmbientDamageOutcome, BossReward, PenaltyTick,
};
pub use campaign_service::{CampaignDamageOutcome, CampaignReward, CampaignService, CampaignStatus};
pub use context::EngineContext;
pub use currency_service::CurrencyService;
pub use focus_service::{FocusService, FocusSessionResult};
pub use quest_service::{QuestProgress, QuestService};
pub use shop_service::{
    ConsumeOutcome, FollowUp, HeldItem, InventoryView, PurchaseReceipt, ShopService, SmugglerOfferView,
    SmugglerSlot,
};
pub use title_service::{TitleService, TitleView};
pub use xp_service::{XpAward, XpService, XpStatus};
