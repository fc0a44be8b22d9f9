//! # Voucher Rules
//!
//! Double-entry balance and the voucher status machine.
//!
//! ## Balance Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines: [+1000 현금, -1000 매출]      declared amount: 1000             │
//! │                                                                         │
//! │  1. any line == 0?            → ValidationError (MustBeNonZero)         │
//! │  2. debit  = Σ positive       = 1000   (checked, else AmountOverflow)   │
//! │     credit = Σ |negative|     = 1000                                    │
//! │  3. debit != credit?          → UnbalancedVoucher { debit, credit }     │
//! │  4. debit != declared?        → AmountMismatch { total, declared }      │
//! │                                                                         │
//! │  OK → VoucherTotals { debit: 1000, credit: 1000 }                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Balance is enforced when a voucher is created. Plain edits of an
//! existing voucher do not re-run it.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::VoucherStatus;

// =============================================================================
// Balance
// =============================================================================

/// Debit and credit totals of a balanced voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoucherTotals {
    pub debit: Money,
    pub credit: Money,
}

/// Sums debit (positive) and credit (absolute negative) amounts.
///
/// Either side leaving `±MAX_AMOUNT` is `AmountOverflow` on `items`.
pub fn totals(amounts: &[Money]) -> CoreResult<VoucherTotals> {
    let overflow = || ValidationError::AmountOverflow {
        field: "items".to_string(),
    };

    let debit = Money::checked_sum(amounts.iter().copied().filter(Money::is_positive))
        .ok_or_else(overflow)?;
    let credit = Money::checked_sum(
        amounts
            .iter()
            .filter(|a| a.is_negative())
            .map(Money::abs),
    )
    .ok_or_else(overflow)?;

    Ok(VoucherTotals { debit, credit })
}

/// Checks that voucher line amounts balance and match the declared amount.
///
/// ```rust
/// use jangbu_core::money::Money;
/// use jangbu_core::voucher::balance_lines;
/// use jangbu_core::CoreError;
///
/// let lines = [Money::from_won(1000), Money::from_won(-900)];
/// let err = balance_lines(&lines, Money::from_won(1000)).unwrap_err();
/// assert!(matches!(err, CoreError::UnbalancedVoucher { .. }));
/// ```
pub fn balance_lines(amounts: &[Money], declared: Money) -> CoreResult<VoucherTotals> {
    if amounts.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    if let Some(i) = amounts.iter().position(Money::is_zero) {
        return Err(ValidationError::MustBeNonZero {
            field: format!("items[{i}].amount"),
        }
        .into());
    }

    let totals = totals(amounts)?;

    if totals.debit != totals.credit {
        return Err(CoreError::UnbalancedVoucher {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    if totals.debit != declared {
        return Err(CoreError::AmountMismatch {
            total: totals.debit,
            declared,
        });
    }

    Ok(totals)
}

// =============================================================================
// Status Machine
// =============================================================================

/// Targets accepted by a status update.
pub const STATUS_TARGETS: [VoucherStatus; 3] = [
    VoucherStatus::Draft,
    VoucherStatus::Confirmed,
    VoucherStatus::Canceled,
];

impl VoucherStatus {
    /// Whether a voucher in `self` may move to `target`.
    ///
    /// ```text
    ///   from \ to   draft  confirmed  canceled
    ///   draft         ✔        ✔         ✔
    ///   confirmed     ✘        ✘         ✔
    ///   rejected      ✔        ✔         ✔
    ///   canceled      ✘        ✘         ✘
    /// ```
    pub fn can_transition_to(self, target: VoucherStatus) -> bool {
        match self {
            VoucherStatus::Canceled => false,
            VoucherStatus::Confirmed => target == VoucherStatus::Canceled,
            VoucherStatus::Draft | VoucherStatus::Rejected => true,
        }
    }
}

/// Validates a requested status change for voucher `voucher_id`.
///
/// A target outside [`STATUS_TARGETS`] is a validation error; a target the
/// current status cannot reach is `InvalidTransition`.
pub fn check_transition(
    voucher_id: &str,
    from: VoucherStatus,
    to: VoucherStatus,
) -> CoreResult<()> {
    if !STATUS_TARGETS.contains(&to) {
        return Err(ValidationError::NotAllowed {
            field: "status".to_string(),
            allowed: STATUS_TARGETS.iter().map(|s| s.to_string()).collect(),
        }
        .into());
    }

    if !from.can_transition_to(to) {
        return Err(CoreError::InvalidTransition {
            voucher_id: voucher_id.to_string(),
            from,
            to,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_AMOUNT;

    fn won(values: &[i64]) -> Vec<Money> {
        values.iter().copied().map(Money::from_won).collect()
    }

    #[test]
    fn test_balanced_voucher() {
        let totals = balance_lines(&won(&[1000, -1000]), Money::from_won(1000)).unwrap();
        assert_eq!(totals.debit.won(), 1000);
        assert_eq!(totals.credit.won(), 1000);
    }

    #[test]
    fn test_split_lines_balance() {
        let totals =
            balance_lines(&won(&[700, 300, -1000]), Money::from_won(1000)).unwrap();
        assert_eq!(totals.debit.won(), 1000);
    }

    #[test]
    fn test_unbalanced_reports_both_totals() {
        let err = balance_lines(&won(&[1000, -900]), Money::from_won(1000)).unwrap_err();
        match err {
            CoreError::UnbalancedVoucher { debit, credit } => {
                assert_eq!(debit.won(), 1000);
                assert_eq!(credit.won(), 900);
            }
            other => panic!("expected UnbalancedVoucher, got {other:?}"),
        }
    }

    #[test]
    fn test_amount_mismatch() {
        let err = balance_lines(&won(&[500, -500]), Money::from_won(1000)).unwrap_err();
        match err {
            CoreError::AmountMismatch { total, declared } => {
                assert_eq!(total.won(), 500);
                assert_eq!(declared.won(), 1000);
            }
            other => panic!("expected AmountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_line_rejected() {
        let err = balance_lines(&won(&[1000, 0, -1000]), Money::from_won(1000)).unwrap_err();
        match err {
            CoreError::Validation(v) => assert_eq!(v.field(), "items[1].amount"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_lines_rejected_not_wrapped() {
        let lines = won(&[i64::MAX, i64::MAX, 2, -i64::MAX, -i64::MAX, -2]);
        match balance_lines(&lines, Money::zero()).unwrap_err() {
            CoreError::Validation(ValidationError::AmountOverflow { field }) => {
                assert_eq!(field, "items")
            }
            other => panic!("expected AmountOverflow, got {other:?}"),
        }

        let lines = won(&[i64::MIN, 1]);
        assert!(matches!(
            balance_lines(&lines, Money::from_won(1)),
            Err(CoreError::Validation(ValidationError::AmountOverflow { .. }))
        ));
    }

    #[test]
    fn test_totals_at_the_limit() {
        let lines = won(&[MAX_AMOUNT, -MAX_AMOUNT]);
        let totals = balance_lines(&lines, Money::from_won(MAX_AMOUNT)).unwrap();
        assert_eq!(totals.debit.won(), MAX_AMOUNT);

        let lines = won(&[MAX_AMOUNT, 1, -MAX_AMOUNT, -1]);
        assert!(totals_overflow(&lines));
    }

    fn totals_overflow(lines: &[Money]) -> bool {
        matches!(
            totals(lines),
            Err(CoreError::Validation(ValidationError::AmountOverflow { .. }))
        )
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            balance_lines(&[], Money::zero()),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_confirmed_only_to_canceled() {
        assert!(check_transition("v", VoucherStatus::Confirmed, VoucherStatus::Canceled).is_ok());
        assert!(matches!(
            check_transition("v", VoucherStatus::Confirmed, VoucherStatus::Draft),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert!(matches!(
            check_transition("v", VoucherStatus::Confirmed, VoucherStatus::Confirmed),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_canceled_is_terminal() {
        for target in STATUS_TARGETS {
            assert!(matches!(
                check_transition("v", VoucherStatus::Canceled, target),
                Err(CoreError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_draft_moves_freely() {
        for target in STATUS_TARGETS {
            assert!(check_transition("v", VoucherStatus::Draft, target).is_ok());
        }
    }

    #[test]
    fn test_rejected_is_not_a_target() {
        assert!(matches!(
            check_transition("v", VoucherStatus::Draft, VoucherStatus::Rejected),
            Err(CoreError::Validation(ValidationError::NotAllowed { .. }))
        ));
    }
}
