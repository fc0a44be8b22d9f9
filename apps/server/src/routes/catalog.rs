//! Reference data the postings point at: items, partners, accounts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::routes::record_activity;
use crate::AppState;
use jangbu_core::{Account, Item, NewAccount, NewItem, NewPartner, Partner};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item))
        .route("/partners", get(list_partners).post(create_partner))
        .route("/partners/{id}", get(get_partner))
        .route("/accounting/accounts", get(list_accounts).post(create_account))
        .route("/accounting/accounts/{id}", get(get_account))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

// =============================================================================
// Items
// =============================================================================

async fn create_item(
    State(state): State<AppState>,
    user: ActingUser,
    ApiJson(input): ApiJson<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let item = state.db.items().create(&input).await?;
    record_activity(&state, &user, "create", "items", Some(&item.id), None).await;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn list_items(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ItemListQuery>,
) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.db.items().list(query.include_inactive).await?))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    state
        .db
        .items()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("item", &id))
}

// =============================================================================
// Partners
// =============================================================================

async fn create_partner(
    State(state): State<AppState>,
    user: ActingUser,
    ApiJson(input): ApiJson<NewPartner>,
) -> Result<(StatusCode, Json<Partner>), ApiError> {
    let partner = state.db.partners().create(&input).await?;
    record_activity(&state, &user, "create", "partners", Some(&partner.id), None).await;
    Ok((StatusCode::CREATED, Json(partner)))
}

async fn list_partners(State(state): State<AppState>) -> Result<Json<Vec<Partner>>, ApiError> {
    Ok(Json(state.db.partners().list().await?))
}

async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Partner>, ApiError> {
    state
        .db
        .partners()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("partner", &id))
}

// =============================================================================
// Chart of accounts
// =============================================================================

async fn create_account(
    State(state): State<AppState>,
    user: ActingUser,
    ApiJson(input): ApiJson<NewAccount>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let account = state.db.accounts().create(&input).await?;
    record_activity(&state, &user, "create", "accounts", Some(&account.id), None).await;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    Ok(Json(state.db.accounts().list().await?))
}

async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    state
        .db
        .accounts()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("account", &id))
}
