//! # Stock Rules
//!
//! Pure inventory arithmetic for sale postings: per-item quantity maps,
//! the old/new diff used when a sale is edited, and the stock pre-check.
//!
//! ## Update Diffing
//! ```text
//! old lines (sale)          new lines (sale)
//! ┌────────┬─────┐          ┌────────┬─────┐
//! │ item A │  4  │          │ item A │  6  │
//! │ item B │  2  │          │ item C │  1  │
//! └────────┴─────┘          └────────┴─────┘
//!         │                         │
//!         └──────── key union ──────┘
//!                      │
//!                      ▼
//!   A: 6 - 4 = +2  → 2 more units leave  → ledger delta -2
//!   B: 0 - 2 = -2  → 2 units come back   → ledger delta +2
//!   C: 1 - 0 = +1  → 1 more unit leaves  → ledger delta -1
//! ```
//!
//! Only sales move stock, so a purchase side contributes an empty map.

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionType;

/// Item id → total quantity, ordered by item id.
pub type QuantityMap = BTreeMap<String, i64>;

/// Sums quantities per item. Repeated items on several lines add up.
pub fn quantities_by_item<'a, I>(lines: I) -> QuantityMap
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut map = QuantityMap::new();
    for (item_id, quantity) in lines {
        *map.entry(item_id.to_string()).or_insert(0) += quantity;
    }
    map
}

/// Quantities that leave stock for a document of the given type.
pub fn outgoing_quantities<'a, I>(transaction_type: TransactionType, lines: I) -> QuantityMap
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    if transaction_type.moves_inventory() {
        quantities_by_item(lines)
    } else {
        QuantityMap::new()
    }
}

/// Change in outgoing quantity of one item across an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityDiff {
    pub item_id: String,
    pub old_quantity: i64,
    pub new_quantity: i64,
}

impl QuantityDiff {
    /// `new - old`; positive means more stock leaves.
    #[inline]
    pub fn diff(&self) -> i64 {
        self.new_quantity - self.old_quantity
    }

    /// The signed change to apply to on-hand inventory.
    #[inline]
    pub fn ledger_delta(&self) -> i64 {
        -self.diff()
    }
}

/// Diffs two quantity maps over their key union, skipping unchanged items.
pub fn diff_quantities(old: &QuantityMap, new: &QuantityMap) -> Vec<QuantityDiff> {
    let mut keys: Vec<&String> = old.keys().chain(new.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .map(|item_id| QuantityDiff {
            item_id: item_id.clone(),
            old_quantity: old.get(item_id).copied().unwrap_or(0),
            new_quantity: new.get(item_id).copied().unwrap_or(0),
        })
        .filter(|d| d.diff() != 0)
        .collect()
}

/// Fails with `InsufficientStock` when `requested` exceeds `available`.
pub fn check_available(
    item_id: &str,
    item_name: &str,
    available: i64,
    requested: i64,
) -> CoreResult<()> {
    if requested > available {
        return Err(CoreError::InsufficientStock {
            item_id: item_id.to_string(),
            item_name: item_name.to_string(),
            available,
            requested,
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

    fn map(entries: &[(&str, i64)]) -> QuantityMap {
        quantities_by_item(entries.iter().copied())
    }

    #[test]
    fn test_repeated_items_are_summed() {
        let m = map(&[("a", 2), ("b", 1), ("a", 3)]);
        assert_eq!(m.get("a"), Some(&5));
        assert_eq!(m.get("b"), Some(&1));
    }

    #[test]
    fn test_purchase_has_no_outgoing_quantities() {
        let lines = [("a", 2)];
        assert!(outgoing_quantities(TransactionType::Purchase, lines).is_empty());
        assert_eq!(
            outgoing_quantities(TransactionType::Sale, lines).get("a"),
            Some(&2)
        );
    }

    #[test]
    fn test_diff_over_key_union() {
        let old = map(&[("a", 4), ("b", 2)]);
        let new = map(&[("a", 6), ("c", 1)]);

        let diffs = diff_quantities(&old, &new);
        let deltas: Vec<(&str, i64)> = diffs
            .iter()
            .map(|d| (d.item_id.as_str(), d.ledger_delta()))
            .collect();

        assert_eq!(deltas, vec![("a", -2), ("b", 2), ("c", -1)]);
    }

    #[test]
    fn test_unchanged_items_are_skipped() {
        let old = map(&[("a", 4), ("b", 2)]);
        let new = map(&[("a", 4), ("b", 3)]);
        let diffs = diff_quantities(&old, &new);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].item_id, "b");
        assert_eq!(diffs[0].diff(), 1);
    }

    #[test]
    fn test_check_available() {
        assert!(check_available("a", "A", 10, 10).is_ok());
        let err = check_available("a", "A", 6, 10).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 6,
                requested: 10,
                ..
            }
        ));
    }
}
