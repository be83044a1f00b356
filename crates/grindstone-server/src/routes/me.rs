//! Me Routes - Status, titles and focus sessions

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};

use super::error::ApiResult;
use crate::auth::CurrentUser;
use crate::models::{
    EquipTitleRequest, EquippedTitleResponse, ErrorResponse, FocusSessionRequest,
    FocusSessionResponse, TitleResponse, XpStatusResponse,
};
use crate::AppState;

/// XP, level progress, gold, titles and active buffs
#[utoipa::path(
    get,
    path = "/me/status",
    responses(
        (status = 200, description = "Current progression", body = XpStatusResponse),
        (status = 401, description = "No user identity", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Progression"
)]
pub async fn get_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<XpStatusResponse> {
    let status = state.xp.get_xp_status(user_id).await?;
    Ok(Json(status.into()))
}

/// Title catalog with unlocked/equipped flags
#[utoipa::path(
    get,
    path = "/me/titles",
    responses(
        (status = 200, description = "All titles", body = Vec<TitleResponse>),
        (status = 401, description = "No user identity", body = ErrorResponse)
    ),
    tag = "Progression"
)]
pub async fn list_titles(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Vec<TitleResponse>> {
    let titles = state.titles.list_titles(user_id).await?;
    Ok(Json(titles.into_iter().map(Into::into).collect()))
}

/// Equip an unlocked title
#[utoipa::path(
    put,
    path = "/me/title",
    request_body = EquipTitleRequest,
    responses(
        (status = 200, description = "Title equipped", body = EquippedTitleResponse),
        (status = 403, description = "Title not unlocked", body = ErrorResponse)
    ),
    tag = "Progression"
)]
pub async fn equip_title(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<EquipTitleRequest>,
) -> ApiResult<EquippedTitleResponse> {
    let active_title = state
        .titles
        .equip_title(user_id, payload.achievement_id)
        .await?;
    Ok(Json(EquippedTitleResponse { active_title }))
}

/// Record a completed focus session
#[utoipa::path(
    post,
    path = "/me/focus-sessions",
    request_body = FocusSessionRequest,
    responses(
        (status = 200, description = "Session applied", body = FocusSessionResponse),
        (status = 400, description = "Minutes out of range", body = ErrorResponse)
    ),
    tag = "Combat"
)]
pub async fn complete_focus_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<FocusSessionRequest>,
) -> ApiResult<FocusSessionResponse> {
    let result = state
        .focus
        .complete_focus_session(user_id, payload.minutes, payload.metric_id)
        .await?;
    Ok(Json(result.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me/status", get(get_status))
        .route("/me/titles", get(list_titles))
        .route("/me/title", put(equip_title))
        .route("/me/focus-sessions", post(complete_focus_session))
}
