//! Double-entry voucher routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::routes::record_activity;
use crate::AppState;
use jangbu_core::{
    Voucher, VoucherDraft, VoucherFilter, VoucherLineDraft, VoucherStatus, VoucherWithItems,
};

const RESOURCE: &str = "vouchers";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounting/vouchers",
            get(list_vouchers).post(create_voucher),
        )
        .route(
            "/accounting/vouchers/{id}",
            get(get_voucher).put(update_voucher).delete(delete_voucher),
        )
        .route("/accounting/vouchers/{id}/status", put(update_voucher_status))
}

/// `{ voucher: {...}, items: [...] }`
#[derive(Debug, Deserialize)]
pub struct CreateVoucherRequest {
    pub voucher: VoucherDraft,
    #[serde(default)]
    pub items: Vec<VoucherLineDraft>,
}

/// Voucher fields at the top level; `items` replaces the lines when present.
#[derive(Debug, Deserialize)]
pub struct UpdateVoucherRequest {
    #[serde(flatten)]
    pub voucher: VoucherDraft,
    pub items: Option<Vec<VoucherLineDraft>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: VoucherStatus,
}

async fn create_voucher(
    State(state): State<AppState>,
    user: ActingUser,
    ApiJson(req): ApiJson<CreateVoucherRequest>,
) -> Result<(StatusCode, Json<VoucherWithItems>), ApiError> {
    let created = state
        .db
        .vouchers()
        .create(&req.voucher, &req.items, Some(user.id()))
        .await?;

    record_activity(
        &state,
        &user,
        "create",
        RESOURCE,
        Some(&created.voucher.id),
        Some(json!({
            "code": created.voucher.code,
            "type": created.voucher.voucher_type,
            "amount": created.voucher.amount,
        })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_vouchers(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<VoucherFilter>,
) -> Result<Json<Vec<Voucher>>, ApiError> {
    Ok(Json(state.db.vouchers().list(&filter).await?))
}

async fn get_voucher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VoucherWithItems>, ApiError> {
    state
        .db
        .vouchers()
        .get_with_items(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("voucher", &id))
}

async fn update_voucher(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateVoucherRequest>,
) -> Result<Json<VoucherWithItems>, ApiError> {
    let updated = state
        .db
        .vouchers()
        .update(&id, &req.voucher, req.items.as_deref())
        .await?;

    record_activity(
        &state,
        &user,
        "update",
        RESOURCE,
        Some(&id),
        Some(json!({
            "code": updated.voucher.code,
            "linesReplaced": req.items.is_some(),
        })),
    )
    .await;

    Ok(Json(updated))
}

async fn update_voucher_status(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Voucher>, ApiError> {
    let voucher = state.db.vouchers().update_status(&id, req.status).await?;

    record_activity(
        &state,
        &user,
        "status",
        RESOURCE,
        Some(&id),
        Some(json!({ "status": voucher.status })),
    )
    .await;

    Ok(Json(voucher))
}

async fn delete_voucher(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.db.vouchers().delete(&id).await? {
        return Err(ApiError::not_found("voucher", &id));
    }

    record_activity(&state, &user, "delete", RESOURCE, Some(&id), None).await;
    Ok(StatusCode::NO_CONTENT)
}
