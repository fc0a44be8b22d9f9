//! Property-based tests for the voucher balance rule.

use proptest::prelude::*;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::voucher::balance_lines;
use crate::MAX_AMOUNT;

/// Strategy for a set of debit amounts (1 to 4 lines, each > 0).
fn debit_lines() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..10_000_000, 1..5)
}

/// Builds balanced lines: the debits, then credits mirroring them either
/// line by line or as one combined credit.
fn balanced(debits: &[i64], single_credit: bool) -> Vec<Money> {
    let mut lines: Vec<Money> = debits.iter().copied().map(Money::from_won).collect();
    if single_credit {
        lines.push(Money::from_won(-debits.iter().sum::<i64>()));
    } else {
        lines.extend(debits.iter().rev().map(|d| Money::from_won(-d)));
    }
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balanced lines whose debit total equals the declared amount pass,
    /// in any order.
    #[test]
    fn prop_balanced_lines_accepted(
        debits in debit_lines(),
        single_credit in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut lines = balanced(&debits, single_credit);
        let len = lines.len();
        lines.rotate_left((seed as usize) % len);

        let declared = Money::from_won(debits.iter().sum());
        let totals = balance_lines(&lines, declared);

        prop_assert!(totals.is_ok(), "expected success, got {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, declared);
        prop_assert_eq!(totals.credit, declared);
    }

    /// Debit and credit sums that differ are always UnbalancedVoucher,
    /// whatever amount is declared.
    #[test]
    fn prop_unbalanced_lines_rejected(
        debits in debit_lines(),
        credits in debit_lines(),
        declared in 1i64..10_000_000,
    ) {
        let debit: i64 = debits.iter().sum();
        let credit: i64 = credits.iter().sum();
        prop_assume!(debit != credit);

        let lines: Vec<Money> = debits
            .iter()
            .map(|d| Money::from_won(*d))
            .chain(credits.iter().map(|c| Money::from_won(-c)))
            .collect();

        let result = balance_lines(&lines, Money::from_won(declared));
        match result {
            Err(CoreError::UnbalancedVoucher { debit: d, credit: c }) => {
                prop_assert_eq!(d.won(), debit);
                prop_assert_eq!(c.won(), credit);
            }
            other => prop_assert!(false, "expected UnbalancedVoucher, got {:?}", other),
        }
    }

    /// Balanced lines with a different declared amount are AmountMismatch.
    #[test]
    fn prop_declared_amount_must_match(
        debits in debit_lines(),
        offset in prop_oneof![-100_000i64..0, 1i64..100_000],
    ) {
        let total: i64 = debits.iter().sum();
        let lines = balanced(&debits, true);

        let result = balance_lines(&lines, Money::from_won(total + offset));
        prop_assert!(
            matches!(result, Err(CoreError::AmountMismatch { .. })),
            "expected AmountMismatch, got {:?}",
            result
        );
    }

    /// Debits near the amount limit either total exactly or overflow,
    /// never wrap.
    #[test]
    fn prop_large_totals_are_exact_or_rejected(
        debits in prop::collection::vec(MAX_AMOUNT / 4..=MAX_AMOUNT, 1..5),
    ) {
        let lines = balanced(&debits, false);
        let exact: i128 = debits.iter().map(|d| i128::from(*d)).sum();
        let declared = Money::from_won(MAX_AMOUNT);

        match balance_lines(&lines, declared) {
            Ok(totals) => {
                prop_assert_eq!(i128::from(totals.debit.won()), exact);
                prop_assert_eq!(totals.credit, totals.debit);
            }
            Err(CoreError::Validation(ValidationError::AmountOverflow { field })) => {
                prop_assert!(exact > i128::from(MAX_AMOUNT));
                prop_assert_eq!(field, "items");
            }
            Err(CoreError::AmountMismatch { .. }) => {
                prop_assert!(exact < i128::from(MAX_AMOUNT));
            }
            other => prop_assert!(false, "unexpected result {:?}", other),
        }
    }

    /// Arbitrary `i64` lines, extremes included, produce a result.
    #[test]
    fn prop_any_lines_settle_without_panicking(
        amounts in prop::collection::vec(
            prop_oneof![Just(i64::MIN), Just(i64::MAX), any::<i64>()],
            1..8,
        ),
        declared in any::<i64>(),
    ) {
        let lines: Vec<Money> = amounts.iter().copied().map(Money::from_won).collect();
        let _ = balance_lines(&lines, Money::from_won(declared));
    }
}
