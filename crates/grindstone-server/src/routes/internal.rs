//! Internal Routes - Adjustments pushed by the daily-log pipeline
//!
//! Guarded by the bearer API key, not by user identity.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use grindstone::{DomainError, XpReason};

use super::error::ApiResult;
use crate::models::{
    EncounterResponse, ErrorResponse, GoldBalanceResponse, GoldChangeRequest, XpAwardResponse,
    XpChangeRequest,
};
use crate::AppState;

fn parse_reason(raw: &str) -> Result<XpReason, DomainError> {
    raw.parse().map_err(DomainError::InvalidInput)
}

/// Award experience
#[utoipa::path(
    post,
    path = "/internal/users/{id}/xp",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = XpChangeRequest,
    responses(
        (status = 200, description = "XP awarded", body = XpAwardResponse),
        (status = 400, description = "Bad amount or reason", body = ErrorResponse),
        (status = 401, description = "Missing API key", body = ErrorResponse)
    ),
    tag = "Internal"
)]
pub async fn award_xp(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<XpChangeRequest>,
) -> ApiResult<XpAwardResponse> {
    let reason = parse_reason(&payload.reason)?;
    let award = state.xp.award_xp(user_id, reason, payload.amount).await?;
    Ok(Json(award.into()))
}

/// Deduct experience, flooring at zero
#[utoipa::path(
    post,
    path = "/internal/users/{id}/xp/deduct",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = XpChangeRequest,
    responses(
        (status = 200, description = "XP deducted", body = XpAwardResponse),
        (status = 400, description = "Bad amount or reason", body = ErrorResponse)
    ),
    tag = "Internal"
)]
pub async fn deduct_xp(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<XpChangeRequest>,
) -> ApiResult<XpAwardResponse> {
    let reason = parse_reason(&payload.reason)?;
    let award = state.xp.deduct_xp(user_id, reason, payload.amount).await?;
    Ok(Json(award.into()))
}

/// Credit gold
#[utoipa::path(
    post,
    path = "/internal/users/{id}/gold",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = GoldChangeRequest,
    responses(
        (status = 200, description = "Gold credited", body = GoldBalanceResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Internal"
)]
pub async fn award_gold(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<GoldChangeRequest>,
) -> ApiResult<GoldBalanceResponse> {
    let gold = state.currency.award_gold(user_id, payload.amount).await?;
    Ok(Json(GoldBalanceResponse { user_id, gold }))
}

/// Debit gold; never goes below zero
#[utoipa::path(
    post,
    path = "/internal/users/{id}/gold/deduct",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = GoldChangeRequest,
    responses(
        (status = 200, description = "Gold debited", body = GoldBalanceResponse),
        (status = 402, description = "Not enough gold", body = ErrorResponse)
    ),
    tag = "Internal"
)]
pub async fn deduct_gold(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<GoldChangeRequest>,
) -> ApiResult<GoldBalanceResponse> {
    let gold = state.currency.deduct_gold(user_id, payload.amount).await?;
    Ok(Json(GoldBalanceResponse { user_id, gold }))
}

/// Spawn an ambient boss if the user has gone quiet long enough
#[utoipa::path(
    post,
    path = "/internal/users/{id}/boss/spawn",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Spawned encounter, or null", body = Option<EncounterResponse>)
    ),
    tag = "Internal"
)]
pub async fn spawn_boss(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Option<EncounterResponse>> {
    let spawned = state.ambient.spawn_if_due(user_id).await?;
    Ok(Json(spawned.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/internal/users/:id/xp", post(award_xp))
        .route("/internal/users/:id/xp/deduct", post(deduct_xp))
        .route("/internal/users/:id/gold", post(award_gold))
        .route("/internal/users/:id/gold/deduct", post(deduct_gold))
        .route("/internal/users/:id/boss/spawn", post(spawn_boss))
}
