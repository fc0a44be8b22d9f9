//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Handler → Result<T, ApiError>                                          │
//! │                                                                         │
//! │  CoreError::NotFound ─────────────────────────────────► 404             │
//! │  CoreError::{Validation, InsufficientStock,                             │
//! │             UnbalancedVoucher, AmountMismatch,                          │
//! │             InvalidTransition, InvalidReference} ─────► 400 + details   │
//! │  DbError::UniqueViolation ────────────────────────────► 409             │
//! │  DbError::Busy, PoolExhausted ────────────────────────► 503             │
//! │  any other DbError ───── error! (logged) ─────────────► 500, generic    │
//! │  bad JSON / query string ─────────────────────────────► 400             │
//! │  missing x-user-id ───────────────────────────────────► 401             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Body
//! ```json
//! {
//!   "code": "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for A4 용지: available 6, requested 10",
//!   "details": { "itemId": "…", "itemName": "A4 용지", "available": 6, "requested": 10 }
//! }
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use jangbu_core::CoreError;
use jangbu_db::DbError;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,

    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    InsufficientStock,
    UnbalancedVoucher,
    AmountMismatch,
    InvalidTransition,
    InvalidReference,
    Conflict,
    Unauthorized,
    ServiceUnavailable,
    Internal,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("{resource} not found: {id}"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    /// Generic 500; the cause is logged by the caller, never sent.
    pub fn internal() -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Converts posting-rule errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(entity, &id),
            CoreError::Validation(e) => {
                ApiError::validation(message).with_details(json!({ "field": e.field() }))
            }
            CoreError::InsufficientStock {
                item_id,
                item_name,
                available,
                requested,
            } => ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::InsufficientStock, message)
                .with_details(json!({
                    "itemId": item_id,
                    "itemName": item_name,
                    "available": available,
                    "requested": requested,
                })),
            CoreError::UnbalancedVoucher { debit, credit } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::UnbalancedVoucher, message)
                    .with_details(json!({ "debit": debit.won(), "credit": credit.won() }))
            }
            CoreError::AmountMismatch { total, declared } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::AmountMismatch, message)
                    .with_details(json!({ "total": total.won(), "declared": declared.won() }))
            }
            CoreError::InvalidTransition { from, to, .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidTransition, message)
                    .with_details(json!({ "from": from, "to": to }))
            }
            CoreError::InvalidReference { entity, id } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidReference, message)
                    .with_details(json!({ "entity": entity, "id": id }))
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => e.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
                format!("{field} '{value}' already exists"),
            )
            .with_details(json!({ "field": field })),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidReference,
                    "Invalid reference",
                )
            }
            DbError::Busy => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Database is busy, retry the request",
            ),
            DbError::PoolExhausted => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "No database connection available, retry the request",
            ),
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}
