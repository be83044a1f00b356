//! Quest Routes

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};

use grindstone::{DomainError, QuestSelector};

use super::error::ApiResult;
use crate::auth::CurrentUser;
use crate::models::{
    AbandonQuestResponse, AdvanceQuestRequest, ErrorResponse, QuestProgressResponse,
    QuestResponse,
};
use crate::AppState;

/// Active and completed quests, newest first
#[utoipa::path(
    get,
    path = "/me/quests",
    responses(
        (status = 200, description = "Quests", body = Vec<QuestResponse>)
    ),
    tag = "Quests"
)]
pub async fn list_quests(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Vec<QuestResponse>> {
    let quests = state.quests.list_quests(user_id).await?;
    Ok(Json(quests.into_iter().map(Into::into).collect()))
}

/// Generate a quest on the user's weakest metric
#[utoipa::path(
    post,
    path = "/me/quests",
    responses(
        (status = 200, description = "Quest created", body = QuestResponse),
        (status = 404, description = "No tracked metric", body = ErrorResponse),
        (status = 409, description = "Quest capacity reached", body = ErrorResponse)
    ),
    tag = "Quests"
)]
pub async fn generate_quest(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<QuestResponse> {
    let quest = state.quests.generate_quest(user_id).await?;
    Ok(Json(quest.into()))
}

/// Count one unit of progress on a metric
#[utoipa::path(
    post,
    path = "/me/quests/advance",
    request_body = AdvanceQuestRequest,
    responses(
        (status = 200, description = "Quests advanced", body = Vec<QuestProgressResponse>)
    ),
    tag = "Quests"
)]
pub async fn advance_quest(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<AdvanceQuestRequest>,
) -> ApiResult<Vec<QuestProgressResponse>> {
    let progress = state
        .quests
        .advance_quest(user_id, payload.metric_id)
        .await?;
    Ok(Json(progress.into_iter().map(Into::into).collect()))
}

/// Abandon one active quest by id, or every active quest with `all`
#[utoipa::path(
    delete,
    path = "/me/quests/{selector}",
    params(
        ("selector" = String, Path, description = "Quest ID or \"all\"")
    ),
    responses(
        (status = 200, description = "Quests removed", body = AbandonQuestResponse),
        (status = 400, description = "Bad selector", body = ErrorResponse),
        (status = 404, description = "Quest not found", body = ErrorResponse)
    ),
    tag = "Quests"
)]
pub async fn abandon_quest(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(selector): Path<String>,
) -> ApiResult<AbandonQuestResponse> {
    let selector: QuestSelector = selector.parse().map_err(DomainError::InvalidInput)?;
    let removed = state.quests.abandon_quest(user_id, selector).await?;
    Ok(Json(AbandonQuestResponse { removed }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me/quests", get(list_quests).post(generate_quest))
        .route("/me/quests/advance", post(advance_quest))
        .route("/me/quests/:selector", delete(abandon_quest))
}
