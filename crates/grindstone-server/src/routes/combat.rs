//! Combat Routes - Ambient boss and campaign

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::error::ApiResult;
use crate::auth::CurrentUser;
use crate::models::{
    AmbientBossResponse, AmbientDamageResponse, CampaignDamageResponse, CampaignStatusResponse,
    DamageRequest, ErrorResponse, PenaltyTickResponse,
};
use crate::AppState;

/// Active ambient boss. Spawns one when due and applies today's penalty.
#[utoipa::path(
    get,
    path = "/me/boss",
    responses(
        (status = 200, description = "Active encounter, if any", body = AmbientBossResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Combat"
)]
pub async fn get_boss(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<AmbientBossResponse> {
    let view = state.ambient.get_active_ambient_boss(user_id).await?;
    Ok(Json(view.into()))
}

/// Deal damage to an ambient boss
#[utoipa::path(
    post,
    path = "/me/boss/{encounter_id}/damage",
    params(
        ("encounter_id" = Uuid, Path, description = "Encounter ID")
    ),
    request_body = DamageRequest,
    responses(
        (status = 200, description = "Damage applied", body = AmbientDamageResponse),
        (status = 404, description = "Encounter not found", body = ErrorResponse)
    ),
    tag = "Combat"
)]
pub async fn damage_boss(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(encounter_id): Path<Uuid>,
    Json(payload): Json<DamageRequest>,
) -> ApiResult<AmbientDamageResponse> {
    let outcome = state
        .ambient
        .deal_ambient_boss_damage(user_id, encounter_id, payload.amount)
        .await?;
    Ok(Json(outcome.into()))
}

/// Apply today's boss penalty. Null when nothing was due.
#[utoipa::path(
    post,
    path = "/me/boss/penalty",
    responses(
        (status = 200, description = "Penalty applied or already claimed", body = Option<PenaltyTickResponse>)
    ),
    tag = "Combat"
)]
pub async fn tick_penalty(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Option<PenaltyTickResponse>> {
    let tick = state.ambient.tick_daily_boss_penalty(user_id).await?;
    Ok(Json(tick.map(Into::into)))
}

/// Current campaign stage and boss
#[utoipa::path(
    get,
    path = "/me/campaign",
    responses(
        (status = 200, description = "Campaign status", body = CampaignStatusResponse)
    ),
    tag = "Combat"
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<CampaignStatusResponse> {
    let status = state.campaign.get_campaign_status(user_id).await?;
    Ok(Json(status.into()))
}

/// Deal damage to the current campaign boss
#[utoipa::path(
    post,
    path = "/me/campaign/damage",
    request_body = DamageRequest,
    responses(
        (status = 200, description = "Damage applied", body = CampaignDamageResponse),
        (status = 400, description = "Non-positive damage", body = ErrorResponse)
    ),
    tag = "Combat"
)]
pub async fn damage_campaign(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<DamageRequest>,
) -> ApiResult<CampaignDamageResponse> {
    let outcome = state
        .campaign
        .deal_campaign_damage(user_id, payload.amount)
        .await?;
    Ok(Json(outcome.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me/boss", get(get_boss))
        .route("/me/boss/penalty", post(tick_penalty))
        .route("/me/boss/:encounter_id/damage", post(damage_boss))
        .route("/me/campaign", get(get_campaign))
        .route("/me/campaign/damage", post(damage_campaign))
}
