//! # Validation Module
//!
//! Schema-level checks on client input, run before a posting opens its
//! atomic scope.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (serde)                                                 │
//! │  └── Shape and types of the JSON body                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Required fields, ranges, line counts (no database needed)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Posting rules (inside the atomic scope)                      │
//! │  ├── References exist (items, accounts, partners)                      │
//! │  ├── Stock pre-check for sales                                         │
//! │  └── Debit == credit == declared amount                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite constraints (UNIQUE, FOREIGN KEY, CHECK)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names in errors use the client's JSON names, with an index for
//! lines: `items[2].quantity`.

use crate::document::{price_lines, transaction_totals};
use crate::error::ValidationError;
use crate::types::{
    NewAccount, NewItem, NewPartner, TransactionDraft, TransactionLineDraft, VoucherDraft,
    VoucherLineDraft,
};
use crate::{MAX_AMOUNT, MAX_DOCUMENT_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_CODE_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_NOTE_LEN: usize = 1000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a business code (item code, account code, partner code).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use jangbu_core::validation::validate_code;
///
/// assert!(validate_code("code", "ITEM-001").is_ok());
/// assert!(validate_code("code", "").is_err());
/// assert!(validate_code("code", "has space").is_err());
/// ```
pub fn validate_code(field: &str, code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name. Must not be blank, at most 200 characters.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates optional free text (notes, descriptions).
pub fn validate_note(field: &str, note: Option<&str>) -> ValidationResult<()> {
    match note {
        Some(text) if text.chars().count() > MAX_NOTE_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NOTE_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates that a reference id was supplied.
///
/// Existence is checked later, inside the atomic scope.
pub fn validate_reference(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
///
/// ```text
/// items[0].quantity = 4        → OK
/// items[0].quantity = 0        → "items[0].quantity must be positive"
/// items[0].quantity = 5000000  → out of range
/// ```
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or amount that may be zero but not negative.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price, tax or total: `0..=MAX_AMOUNT`.
pub fn validate_amount(field: &str, value: i64) -> ValidationResult<()> {
    validate_non_negative(field, value)?;
    if value > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Validates a signed amount (voucher line, declared voucher amount):
/// `-MAX_AMOUNT..=MAX_AMOUNT`.
///
/// Only the magnitude is bounded here. Sign and zero rules belong to the
/// posting, see [`crate::voucher`].
pub fn validate_signed_amount(field: &str, value: i64) -> ValidationResult<()> {
    if !(-MAX_AMOUNT..=MAX_AMOUNT).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: -MAX_AMOUNT,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10000,
        });
    }
    Ok(())
}

/// Validates a manual inventory adjustment delta.
///
/// The sign is the direction; zero is meaningless. There is no floor:
/// manual adjustments may take stock negative.
pub fn validate_adjustment(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "quantity".to_string(),
        });
    }
    if delta.unsigned_abs() > MAX_LINE_QUANTITY.unsigned_abs() {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_LINE_QUANTITY,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines on a document: at least one, at most
/// MAX_DOCUMENT_LINES.
pub fn validate_line_count(field: &str, count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if count > MAX_DOCUMENT_LINES {
        return Err(ValidationError::TooMany {
            field: field.to_string(),
            max: MAX_DOCUMENT_LINES,
        });
    }

    Ok(())
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates a transaction header and its lines.
pub fn validate_transaction(
    draft: &TransactionDraft,
    lines: &[TransactionLineDraft],
) -> ValidationResult<()> {
    if let Some(partner_id) = draft.partner_id.as_deref() {
        validate_reference("partnerId", partner_id)?;
    }
    if let Some(total) = draft.total_amount {
        validate_amount("totalAmount", total)?;
    }
    if let Some(tax) = draft.tax_amount {
        validate_amount("taxAmount", tax)?;
    }
    validate_note("notes", draft.notes.as_deref())?;

    validate_line_count("items", lines.len())?;
    for (i, line) in lines.iter().enumerate() {
        validate_reference(&format!("items[{i}].itemId"), &line.item_id)?;
        validate_quantity(&format!("items[{i}].quantity"), line.quantity)?;
        validate_amount(&format!("items[{i}].unitPrice"), line.unit_price)?;
        if let Some(bps) = line.tax_rate_bps {
            validate_tax_rate_bps(&format!("items[{i}].taxRateBps"), bps)?;
        }
        if let Some(tax) = line.tax_amount {
            validate_amount(&format!("items[{i}].taxAmount"), tax)?;
        }
        validate_note(&format!("items[{i}].description"), line.description.as_deref())?;
    }

    let priced = price_lines(lines)?;
    transaction_totals(draft, &priced)?;

    Ok(())
}

/// Validates a voucher header.
pub fn validate_voucher_header(draft: &VoucherDraft) -> ValidationResult<()> {
    validate_signed_amount("amount", draft.amount)?;
    validate_note("description", draft.description.as_deref())
}

/// Validates the shape of voucher lines (count, references, magnitudes).
///
/// Zero amounts and the balance are posting rules, see [`crate::voucher`].
pub fn validate_voucher_lines(lines: &[VoucherLineDraft]) -> ValidationResult<()> {
    validate_line_count("items", lines.len())?;
    for (i, line) in lines.iter().enumerate() {
        validate_reference(&format!("items[{i}].accountId"), &line.account_id)?;
        validate_signed_amount(&format!("items[{i}].amount"), line.amount)?;
        validate_note(&format!("items[{i}].description"), line.description.as_deref())?;
    }
    Ok(())
}

pub fn validate_new_item(item: &NewItem) -> ValidationResult<()> {
    validate_code("code", &item.code)?;
    validate_name("name", &item.name)?;
    validate_amount("unitPrice", item.unit_price)?;
    validate_amount("costPrice", item.cost_price)?;
    validate_non_negative("minStock", item.min_stock)?;
    Ok(())
}

pub fn validate_new_partner(partner: &NewPartner) -> ValidationResult<()> {
    validate_code("code", &partner.code)?;
    validate_name("name", &partner.name)
}

pub fn validate_new_account(account: &NewAccount) -> ValidationResult<()> {
    validate_code("code", &account.code)?;
    validate_name("name", &account.name)
}

// =============================================================================
// Unit Tests
// =============================================================================
