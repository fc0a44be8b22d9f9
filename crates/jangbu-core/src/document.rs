//! # Documents
//!
//! Document codes and line pricing shared by transactions and vouchers.
//!
//! ## Code Format
//! ```text
//!   I 20261016 - 001
//!   │ │          │
//!   │ │          └── daily sequence, zero-padded to 3 digits
//!   │ └──────────── document date (YYYYMMDD)
//!   └────────────── type letter
//!
//!   Vouchers:      I = income, E = expense, T = transfer
//!   Transactions:  S = sale,   P = purchase
//! ```
//!
//! The sequence is scoped to the prefix: the first income voucher dated
//! 2026-10-16 is `I20261016-001`, the first expense voucher that day is
//! `E20261016-001`.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ValidationResult;
use crate::types::{TaxRate, TransactionDraft, TransactionLineDraft, TransactionType, VoucherType};

// =============================================================================
// Codes
// =============================================================================

/// Document types that carry a daily-sequenced code.
pub trait CodePrefix {
    fn letter(&self) -> char;
}

impl CodePrefix for VoucherType {
    fn letter(&self) -> char {
        match self {
            VoucherType::Income => 'I',
            VoucherType::Expense => 'E',
            VoucherType::Transfer => 'T',
        }
    }
}

impl CodePrefix for TransactionType {
    fn letter(&self) -> char {
        match self {
            TransactionType::Sale => 'S',
            TransactionType::Purchase => 'P',
        }
    }
}

/// `{letter}{YYYYMMDD}-`, the part shared by every code of one day.
pub fn code_prefix(kind: &impl CodePrefix, date: NaiveDate) -> String {
    format!("{}{}-", kind.letter(), date.format("%Y%m%d"))
}

/// Next code after the highest existing code with the same prefix.
///
/// A `last` code that does not parse as `prefix + number` is ignored.
///
/// ```rust
/// use jangbu_core::document::next_code;
///
/// assert_eq!(next_code("I20261016-", None), "I20261016-001");
/// assert_eq!(next_code("I20261016-", Some("I20261016-041")), "I20261016-042");
/// ```
pub fn next_code(prefix: &str, last: Option<&str>) -> String {
    let sequence = last
        .and_then(|code| code.strip_prefix(prefix))
        .and_then(|seq| seq.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;
    format!("{prefix}{sequence:03}")
}

// =============================================================================
// Line Pricing
// =============================================================================

/// Amounts of one priced transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub amount: Money,
    pub tax: Money,
    pub tax_rate: TaxRate,
}

/// Prices a line: `amount = quantity × unit_price`, tax is the explicit
/// amount when given, else computed at the line's rate.
///
/// `None` when the amount leaves `±MAX_AMOUNT`.
pub fn price_line(line: &TransactionLineDraft) -> Option<PricedLine> {
    let amount = Money::from_won(line.unit_price).multiply_quantity(line.quantity)?;
    let tax_rate = TaxRate::from_bps(line.tax_rate_bps.unwrap_or(0));
    let tax = line
        .tax_amount
        .map(Money::from_won)
        .unwrap_or_else(|| amount.calculate_tax(tax_rate));
    Some(PricedLine {
        amount,
        tax,
        tax_rate,
    })
}

/// Prices every line, failing with `AmountOverflow` on `items[i].amount`.
pub fn price_lines(lines: &[TransactionLineDraft]) -> ValidationResult<Vec<PricedLine>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            price_line(line).ok_or_else(|| ValidationError::AmountOverflow {
                field: format!("items[{i}].amount"),
            })
        })
        .collect()
}

/// Header totals of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    pub total: Money,
    pub tax: Money,
}

/// Header totals: explicit values win, otherwise summed from the lines
/// (`total` includes tax).
///
/// A sum past `MAX_AMOUNT` is `AmountOverflow` on the header field.
pub fn transaction_totals(
    draft: &TransactionDraft,
    lines: &[PricedLine],
) -> ValidationResult<DocumentTotals> {
    let overflow = |field: &str| ValidationError::AmountOverflow {
        field: field.to_string(),
    };

    let total = match draft.total_amount {
        Some(total) => Money::from_won(total),
        None => lines
            .iter()
            .try_fold(Money::zero(), |acc, l| {
                acc.checked_add(l.amount)?.checked_add(l.tax)
            })
            .ok_or_else(|| overflow("totalAmount"))?,
    };
    let tax = match draft.tax_amount {
        Some(tax) => Money::from_won(tax),
        None => Money::checked_sum(lines.iter().map(|l| l.tax))
            .ok_or_else(|| overflow("taxAmount"))?,
    };

    Ok(DocumentTotals { total, tax })
}

// =============================================================================
// Unit Tests
// =============================================================================
