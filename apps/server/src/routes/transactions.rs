//! Sale/purchase transaction routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::ApiError;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::routes::record_activity;
use crate::telemetry::ERROR_LOG_TARGET;
use crate::AppState;
use jangbu_core::{
    Transaction, TransactionDraft, TransactionFilter, TransactionItem, TransactionLineDraft,
    TransactionSummary,
};

const RESOURCE: &str = "transactions";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{id}/items", get(list_transaction_items))
}

/// `{ transaction: {...}, items: [...] }`
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub transaction: TransactionDraft,
    #[serde(default)]
    pub items: Vec<TransactionLineDraft>,
}

/// Transaction fields at the top level, plus `items`.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(flatten)]
    pub transaction: TransactionDraft,
    #[serde(default)]
    pub items: Vec<TransactionLineDraft>,
}

async fn create_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    ApiJson(req): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let transaction = state
        .db
        .transactions()
        .create(&req.transaction, &req.items, Some(user.id()))
        .await?;

    record_activity(
        &state,
        &user,
        "create",
        RESOURCE,
        Some(&transaction.id),
        Some(json!({
            "code": transaction.code,
            "type": transaction.transaction_type,
            "lines": req.items.len(),
            "totalAmount": transaction.total_amount,
        })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn list_transactions(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<TransactionFilter>,
) -> Result<Json<Vec<TransactionSummary>>, ApiError> {
    match state.db.transactions().list(&filter).await {
        Ok(transactions) => Ok(Json(transactions)),
        Err(err) => {
            error!(target: ERROR_LOG_TARGET, error = ?err, ?filter, "Failed to list transactions");
            Err(err.into())
        }
    }
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionSummary>, ApiError> {
    state
        .db
        .transactions()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("transaction", &id))
}

async fn list_transaction_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TransactionItem>>, ApiError> {
    if state.db.transactions().get_by_id(&id).await?.is_none() {
        return Err(ApiError::not_found("transaction", &id));
    }
    Ok(Json(state.db.transactions().items(&id).await?))
}

async fn update_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .db
        .transactions()
        .update(&id, &req.transaction, &req.items, Some(user.id()))
        .await?;

    record_activity(
        &state,
        &user,
        "update",
        RESOURCE,
        Some(&id),
        Some(json!({ "code": transaction.code, "lines": req.items.len() })),
    )
    .await;

    Ok(Json(transaction))
}

async fn delete_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.db.transactions().delete(&id, Some(user.id())).await? {
        return Err(ApiError::not_found("transaction", &id));
    }

    record_activity(&state, &user, "delete", RESOURCE, Some(&id), None).await;
    Ok(StatusCode::NO_CONTENT)
}
