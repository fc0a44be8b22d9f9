//! # Error Types
//!
//! The domain error taxonomy for jangbu-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  jangbu-core errors (this file)                                        │
//! │  ├── CoreError        - Posting rule violations                        │
//! │  └── ValidationError  - Malformed or missing fields                    │
//! │                                                                         │
//! │  jangbu-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  HTTP errors (apps/server)                                             │
//! │  └── ApiError         - Status code + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule violation is raised before the first write of a posting, so
//! returning one of these aborts the surrounding atomic scope with nothing
//! persisted.

use thiserror::Error;

use crate::money::Money;
use crate::types::VoucherStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Posting rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A transaction, voucher, item or account does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A sale would drive on-hand inventory below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Post sale (item X, qty: 10)
    ///      │
    ///      ▼
    /// Read on-hand: 6
    ///      │
    ///      ▼
    /// InsufficientStock { item_name: "X", available: 6, requested: 10 }
    ///      │
    ///      ▼
    /// Client shows: "X has only 6 on hand"
    /// ```
    #[error("Insufficient stock for {item_name}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        item_name: String,
        available: i64,
        requested: i64,
    },

    /// Debit and credit totals of a voucher disagree.
    #[error("Voucher is unbalanced: debit {debit}, credit {credit}")]
    UnbalancedVoucher { debit: Money, credit: Money },

    /// Balanced totals disagree with the voucher's declared amount.
    #[error("Voucher total {total} does not match declared amount {declared}")]
    AmountMismatch { total: Money, declared: Money },

    /// Illegal voucher status change.
    #[error("Voucher {voucher_id} cannot move from {from} to {to}")]
    InvalidTransition {
        voucher_id: String,
        from: VoucherStatus,
        to: VoucherStatus,
    },

    /// A line points at an item, account or partner that does not exist.
    #[error("Unknown {entity} referenced: {id}")]
    InvalidReference { entity: &'static str, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_reference(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::InvalidReference {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending field so the HTTP layer can return
/// field-level detail.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Too many entries in a list field.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// A computed amount (line amount, sum of lines) leaves the supported range.
    #[error("{field} exceeds the largest supported amount")]
    AmountOverflow { field: String },
}

impl ValidationError {
    /// The field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustBeNonZero { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::TooMany { field, .. }
            | ValidationError::AmountOverflow { field } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
