//! Shop Routes - Catalog, purchases, inventory and the smuggler

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::error::ApiResult;
use crate::auth::CurrentUser;
use crate::models::{
    ConsumeResponse, ErrorResponse, InventoryResponse, ItemResponse, PurchaseRequest,
    PurchaseResponse, SmugglerOfferResponse,
};
use crate::AppState;

/// Items for sale at catalog price
#[utoipa::path(
    get,
    path = "/shop/items",
    responses(
        (status = 200, description = "Purchasable items", body = Vec<ItemResponse>)
    ),
    tag = "Shop"
)]
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Vec<ItemResponse>> {
    let items = state.shop.list_shop_items().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Buy an item, optionally through a smuggler offer
#[utoipa::path(
    post,
    path = "/me/shop/purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Purchase complete", body = PurchaseResponse),
        (status = 402, description = "Not enough gold", body = ErrorResponse),
        (status = 409, description = "Stack limit reached", body = ErrorResponse),
        (status = 410, description = "Smuggler offer expired", body = ErrorResponse)
    ),
    tag = "Shop"
)]
pub async fn purchase(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<PurchaseRequest>,
) -> ApiResult<PurchaseResponse> {
    let receipt = state
        .shop
        .purchase(user_id, payload.item_id, payload.smuggler_event_id)
        .await?;
    Ok(Json(receipt.into()))
}

/// Consumables, passive stacks and active buffs
#[utoipa::path(
    get,
    path = "/me/inventory",
    responses(
        (status = 200, description = "Inventory", body = InventoryResponse)
    ),
    tag = "Shop"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<InventoryResponse> {
    let view = state.shop.get_inventory(user_id).await?;
    Ok(Json(view.into()))
}

/// Use one unit of a consumable
#[utoipa::path(
    post,
    path = "/me/inventory/{item_id}/consume",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item consumed", body = ConsumeResponse),
        (status = 404, description = "Item not held", body = ErrorResponse),
        (status = 409, description = "Effect already active", body = ErrorResponse)
    ),
    tag = "Shop"
)]
pub async fn consume(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> ApiResult<ConsumeResponse> {
    let outcome = state.shop.consume(user_id, item_id).await?;
    Ok(Json(outcome.into()))
}

/// Current smuggler offer, rolling for a new one when none is open
#[utoipa::path(
    get,
    path = "/me/smuggler",
    responses(
        (status = 200, description = "Smuggler offer, possibly empty", body = SmugglerOfferResponse)
    ),
    tag = "Shop"
)]
pub async fn get_smuggler_offer(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<SmugglerOfferResponse> {
    let offer = state.shop.get_or_spawn_smuggler_offer(user_id).await?;
    Ok(Json(offer.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shop/items", get(list_items))
        .route("/me/shop/purchase", post(purchase))
        .route("/me/inventory", get(get_inventory))
        .route("/me/inventory/:item_id/consume", post(consume))
        .route("/me/smuggler", get(get_smuggler_offer))
}
