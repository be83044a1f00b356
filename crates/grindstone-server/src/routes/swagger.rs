//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    AbandonQuestResponse,
    AdvanceQuestRequest,
    // Combat models
    AmbientBossResponse,
    AmbientDamageResponse,
    BuffResponse,
    CampaignBossResponse,
    CampaignDamageResponse,
    CampaignStatusResponse,
    // Shop models
    ConsumeResponse,
    DamageRequest,
    EncounterResponse,
    // Progression models
    EquipTitleRequest,
    EquippedTitleResponse,
    ErrorResponse,
    FocusSessionRequest,
    FocusSessionResponse,
    FollowUpResponse,
    GoldBalanceResponse,
    GoldChangeRequest,
    HeldItemResponse,
    InventoryResponse,
    ItemResponse,
    PenaltyTickResponse,
    PurchaseRequest,
    PurchaseResponse,
    // Quest models
    QuestProgressResponse,
    QuestResponse,
    RewardResponse,
    SmugglerOfferResponse,
    SmugglerSlotResponse,
    TitleResponse,
    XpAwardResponse,
    XpChangeRequest,
    XpStatusResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Progression endpoints
        super::me::get_status,
        super::me::list_titles,
        super::me::equip_title,
        super::me::complete_focus_session,
        // Combat endpoints
        super::combat::get_boss,
        super::combat::damage_boss,
        super::combat::tick_penalty,
        super::combat::get_campaign,
        super::combat::damage_campaign,
        // Quest endpoints
        super::quests::list_quests,
        super::quests::generate_quest,
        super::quests::advance_quest,
        super::quests::abandon_quest,
        // Shop endpoints
        super::shop::list_items,
        super::shop::purchase,
        super::shop::get_inventory,
        super::shop::consume,
        super::shop::get_smuggler_offer,
        // Internal endpoints
        super::internal::award_xp,
        super::internal::deduct_xp,
        super::internal::award_gold,
        super::internal::deduct_gold,
        super::internal::spawn_boss,
    ),
    info(
        title = "Grindstone API",
        version = "0.1.0",
        description = "Progression & Combat Engine API\n\nXP and levels, gold, titles, ambient and campaign bosses, quests and the item economy.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Progression", description = "XP, levels, titles and focus sessions"),
        (name = "Combat", description = "Ambient boss and campaign"),
        (name = "Quests", description = "Generated quests on tracked metrics"),
        (name = "Shop", description = "Catalog, inventory, buffs and the smuggler"),
        (name = "Internal", description = "Daily-log pipeline adjustments (API key)"),
    ),
    components(
        schemas(
            // Progression
            XpChangeRequest,
            GoldChangeRequest,
            EquipTitleRequest,
            XpAwardResponse,
            XpStatusResponse,
            BuffResponse,
            GoldBalanceResponse,
            TitleResponse,
            EquippedTitleResponse,
            // Combat
            DamageRequest,
            FocusSessionRequest,
            EncounterResponse,
            PenaltyTickResponse,
            AmbientBossResponse,
            RewardResponse,
            AmbientDamageResponse,
            CampaignBossResponse,
            CampaignStatusResponse,
            CampaignDamageResponse,
            FocusSessionResponse,
            // Quests
            AdvanceQuestRequest,
            QuestResponse,
            QuestProgressResponse,
            AbandonQuestResponse,
            // Shop
            PurchaseRequest,
            ItemResponse,
            PurchaseResponse,
            FollowUpResponse,
            ConsumeResponse,
            HeldItemResponse,
            InventoryResponse,
            SmugglerSlotResponse,
            SmugglerOfferResponse,
            // Errors
            ErrorResponse,
        )
    ),
)]
pub struct ApiDoc;
