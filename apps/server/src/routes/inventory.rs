//! Inventory ledger routes: on-hand quantities, history, manual adjustments.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::extract::{ActingUser, ApiJson};
use crate::routes::record_activity;
use crate::AppState;
use jangbu_core::{InventoryHistoryEntry, StockLevel};
use jangbu_db::ManualAdjustment;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_stock_levels))
        .route("/inventory/alerts/low", get(list_low_stock))
        .route("/inventory/history", get(list_history))
        .route("/inventory/{item_id}", get(get_quantity))
        .route("/inventory/{item_id}/adjust", post(adjust_stock))
        .route("/inventory/{item_id}/history", get(list_item_history))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityResponse {
    pub item_id: String,
    pub quantity: i64,
}

/// Signed change: positive receives stock, negative removes it.
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub quantity: i64,
    pub notes: Option<String>,
}

async fn list_stock_levels(State(state): State<AppState>) -> Result<Json<Vec<StockLevel>>, ApiError> {
    Ok(Json(state.db.inventory().stock_levels().await?))
}

async fn list_low_stock(State(state): State<AppState>) -> Result<Json<Vec<StockLevel>>, ApiError> {
    Ok(Json(state.db.inventory().low_stock().await?))
}

async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryHistoryEntry>>, ApiError> {
    Ok(Json(state.db.inventory().history(None).await?))
}

async fn get_quantity(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<QuantityResponse>, ApiError> {
    if state.db.items().get_by_id(&item_id).await?.is_none() {
        return Err(ApiError::not_found("item", &item_id));
    }

    let quantity = state.db.inventory().get_quantity(&item_id).await?;
    Ok(Json(QuantityResponse { item_id, quantity }))
}

async fn list_item_history(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<Vec<InventoryHistoryEntry>>, ApiError> {
    Ok(Json(state.db.inventory().history(Some(&item_id)).await?))
}

async fn adjust_stock(
    State(state): State<AppState>,
    user: ActingUser,
    Path(item_id): Path<String>,
    ApiJson(req): ApiJson<AdjustRequest>,
) -> Result<Json<ManualAdjustment>, ApiError> {
    let adjustment = state
        .db
        .inventory()
        .adjust(&item_id, req.quantity, req.notes.as_deref(), Some(user.id()))
        .await?;

    record_activity(
        &state,
        &user,
        "adjust",
        "inventory",
        Some(&item_id),
        Some(json!({
            "change": req.quantity,
            "quantityAfter": adjustment.stock.quantity,
        })),
    )
    .await;

    Ok(Json(adjustment))
}
