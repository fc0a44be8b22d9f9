//! Inventory ledger: quantities, manual adjustments and history.

mod common;

use common::*;
use jangbu_core::{CoreError, InventoryChangeType, NewItem, ValidationError};
use jangbu_db::DbError;

#[tokio::test]
async fn test_untouched_item_has_zero_quantity() {
    let db = test_db().await;
    let pen = item(&db, "PEN").await;

    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 0);
    assert!(db.inventory().history(Some(&pen.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_adjustment_returns_item_stock_and_history() {
    let db = test_db().await;
    let pen = item(&db, "PEN").await;

    let result = db
        .inventory()
        .adjust(&pen.id, 25, Some("입고"), Some("kim"))
        .await
        .unwrap();

    assert_eq!(result.item.id, pen.id);
    assert_eq!(result.stock.quantity, 25);
    assert_eq!(result.history.quantity_before, 0);
    assert_eq!(result.history.quantity_after, 25);
    assert_eq!(result.history.change, 25);
    assert_eq!(result.history.transaction_type, InventoryChangeType::Adjustment);
    assert_eq!(result.history.notes.as_deref(), Some("입고"));
    assert_eq!(result.history.created_by.as_deref(), Some("kim"));
}

#[tokio::test]
async fn test_manual_adjustment_may_go_negative() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 3).await;

    let result = db.inventory().adjust(&pen.id, -5, None, None).await.unwrap();

    assert_eq!(result.stock.quantity, -2);
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), -2);
}

#[tokio::test]
async fn test_adjusting_unknown_item_is_not_found() {
    let db = test_db().await;

    let err = db
        .inventory()
        .adjust("no-such-item", 5, None, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Domain(CoreError::NotFound { entity: "item", .. })
    ));
    assert_eq!(count(&db, "inventory").await, 0);
    assert_eq!(count(&db, "inventory_history").await, 0);
}

#[tokio::test]
async fn test_zero_adjustment_is_rejected() {
    let db = test_db().await;
    let pen = item(&db, "PEN").await;

    let err = db.inventory().adjust(&pen.id, 0, None, None).await.unwrap_err();

    assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    assert_eq!(count(&db, "inventory_history").await, 0);
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let db = test_db().await;
    let pen = item(&db, "PEN").await;
    let clip = item(&db, "CLIP").await;

    db.inventory().adjust(&pen.id, 10, Some("first"), None).await.unwrap();
    db.inventory().adjust(&clip.id, 4, Some("other"), None).await.unwrap();
    db.inventory().adjust(&pen.id, -3, Some("second"), None).await.unwrap();

    let pen_history = db.inventory().history(Some(&pen.id)).await.unwrap();
    let notes: Vec<_> = pen_history.iter().map(|e| e.notes.as_deref()).collect();
    assert_eq!(notes, vec![Some("second"), Some("first")]);

    let all = db.inventory().history(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].notes.as_deref(), Some("second"));
    assert_eq!(all[2].notes.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_every_history_entry_is_consistent() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 20).await;

    for delta in [5, -7, 12, -30, 1] {
        let result = db.inventory().adjust(&pen.id, delta, None, None).await.unwrap();
        let entry = &result.history;
        assert_eq!(entry.quantity_after, entry.quantity_before + entry.change);
        assert_eq!(
            db.inventory().get_quantity(&pen.id).await.unwrap(),
            entry.quantity_after
        );
    }

    // the chain of entries must link up oldest to newest
    let mut history = db.inventory().history(Some(&pen.id)).await.unwrap();
    history.reverse();
    assert_eq!(history[0].quantity_before, 0);
    for pair in history.windows(2) {
        assert_eq!(pair[0].quantity_after, pair[1].quantity_before);
    }
    let total: i64 = history.iter().map(|e| e.change).sum();
    assert_eq!(total, db.inventory().get_quantity(&pen.id).await.unwrap());
}

#[tokio::test]
async fn test_stock_levels_and_low_stock() {
    let db = test_db().await;
    let toner = db
        .items()
        .create(&NewItem {
            code: "TONER".to_string(),
            name: "토너".to_string(),
            category_id: None,
            unit_price: 89_000,
            cost_price: 61_000,
            unit: Some("EA".to_string()),
            min_stock: 5,
        })
        .await
        .unwrap();
    db.inventory().adjust(&toner.id, 2, None, None).await.unwrap();
    let paper = stocked_item(&db, "A4", 40).await;

    let levels = db.inventory().stock_levels().await.unwrap();
    assert_eq!(levels.len(), 2);
    let paper_level = levels.iter().find(|l| l.item_id == paper.id).unwrap();
    assert_eq!(paper_level.quantity, 40);

    let low = db.inventory().low_stock().await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].item_id, toner.id);
    assert!(low[0].is_below_minimum());
}

#[tokio::test]
async fn test_out_of_range_adjustment_leaves_stock_alone() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 7).await;

    for delta in [i64::MIN, i64::MAX] {
        let err = db
            .inventory()
            .adjust(&pen.id, delta, None, Some("kim"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { ref field, .. }))
                if field == "quantity"
        ));
    }

    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 7);
    assert_eq!(db.inventory().history(Some(&pen.id)).await.unwrap().len(), 1);
}
