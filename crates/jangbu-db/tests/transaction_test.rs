//! Transaction poster: sale/purchase postings and their stock effects.

mod common;

use common::*;
use jangbu_core::{
    CoreError, InventoryChangeType, TransactionFilter, TransactionStatus, TransactionType,
    ValidationError, MAX_AMOUNT, NOTE_SALE_CANCELED, NOTE_SALE_POSTED, NOTE_SALE_UPDATED,
};
use jangbu_db::{Database, DbConfig, DbError};

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_sale_takes_stock_and_refuses_to_oversell() {
    let db = test_db().await;
    let x = stocked_item(&db, "X", 10).await;

    let sale_tx = db
        .transactions()
        .create(&sale(), &[line(&x, 4)], Some("kim"))
        .await
        .unwrap();

    assert_eq!(db.inventory().get_quantity(&x.id).await.unwrap(), 6);
    let history = db.inventory().history(Some(&x.id)).await.unwrap();
    let entry = &history[0];
    assert_eq!(entry.transaction_type, InventoryChangeType::Sale);
    assert_eq!(entry.transaction_id.as_deref(), Some(sale_tx.id.as_str()));
    assert_eq!(
        (entry.quantity_before, entry.quantity_after, entry.change),
        (10, 6, -4)
    );
    assert_eq!(entry.notes.as_deref(), Some(NOTE_SALE_POSTED));

    let err = db
        .transactions()
        .create(&sale(), &[line(&x, 10)], Some("kim"))
        .await
        .unwrap_err();

    match err {
        DbError::Domain(CoreError::InsufficientStock {
            item_id,
            item_name,
            available,
            requested,
        }) => {
            assert_eq!(item_id, x.id);
            assert_eq!(item_name, x.name);
            assert_eq!(available, 6);
            assert_eq!(requested, 10);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(db.inventory().get_quantity(&x.id).await.unwrap(), 6);
    assert_eq!(count(&db, "transactions").await, 1);
}

#[tokio::test]
async fn test_failed_sale_leaves_no_partial_decrement() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 50).await;
    let clip = stocked_item(&db, "CLIP", 2).await;
    let history_before = count(&db, "inventory_history").await;

    let err = db
        .transactions()
        .create(&sale(), &[line(&pen, 5), line(&clip, 3)], None)
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 50);
    assert_eq!(db.inventory().get_quantity(&clip.id).await.unwrap(), 2);
    assert_eq!(count(&db, "transactions").await, 0);
    assert_eq!(count(&db, "transaction_items").await, 0);
    assert_eq!(count(&db, "inventory_history").await, history_before);
}

#[tokio::test]
async fn test_repeated_lines_are_checked_together() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 5).await;

    let err = db
        .transactions()
        .create(&sale(), &[line(&pen, 3), line(&pen, 3)], None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientStock { available: 5, requested: 6, .. })
    ));
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_sale_never_drives_stock_negative() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 7).await;

    for quantity in [3, 3, 3, 1, 2, 1] {
        let _ = db
            .transactions()
            .create(&sale(), &[line(&pen, quantity)], None)
            .await;
        assert!(db.inventory().get_quantity(&pen.id).await.unwrap() >= 0);
    }
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_purchase_does_not_move_stock() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 1).await;

    let purchase_tx = db
        .transactions()
        .create(&purchase(), &[line(&pen, 100)], None)
        .await
        .unwrap();

    assert_eq!(purchase_tx.transaction_type, TransactionType::Purchase);
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 1);
    assert_eq!(db.transactions().items(&purchase_tx.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_item_or_partner_is_invalid_reference() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 10).await;

    let mut ghost = line(&pen, 1);
    ghost.item_id = "no-such-item".to_string();
    let err = db
        .transactions()
        .create(&sale(), &[line(&pen, 1), ghost], None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InvalidReference { entity: "item", .. })
    ));

    let mut draft = sale();
    draft.partner_id = Some("no-such-partner".to_string());
    let err = db
        .transactions()
        .create(&draft, &[line(&pen, 1)], None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InvalidReference { entity: "partner", .. })
    ));

    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 10);
}

#[tokio::test]
async fn test_empty_lines_rejected() {
    let db = test_db().await;

    let err = db.transactions().create(&sale(), &[], None).await.unwrap_err();

    assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_codes_and_totals() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 10).await;
    let stamp = today().format("%Y%m%d").to_string();

    let mut taxed = line(&pen, 3);
    taxed.tax_rate_bps = Some(1000);
    let first = db.transactions().create(&sale(), &[taxed], None).await.unwrap();
    let second = db.transactions().create(&sale(), &[line(&pen, 1)], None).await.unwrap();
    let bought = db.transactions().create(&purchase(), &[line(&pen, 1)], None).await.unwrap();

    assert_eq!(first.code, format!("S{stamp}-001"));
    assert_eq!(second.code, format!("S{stamp}-002"));
    assert_eq!(bought.code, format!("P{stamp}-001"));

    assert_eq!(first.total_amount, 3_300);
    assert_eq!(first.tax_amount, 300);
    assert_eq!(first.status, TransactionStatus::Pending);

    let lines = db.transactions().items(&first.id).await.unwrap();
    assert_eq!(lines[0].amount, 3_000);
    assert_eq!(lines[0].tax_amount, 300);
    assert_eq!(lines[0].tax_rate_bps, 1000);
}

#[tokio::test]
async fn test_prices_past_the_amount_limit_are_rejected() {
    let db = test_db().await;
    let x = item(&db, "X").await;

    let mut pricey = line(&x, 2);
    pricey.unit_price = i64::MAX;
    let err = db
        .transactions()
        .create(&purchase(), &[pricey], None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { ref field, .. }))
            if field == "items[0].unitPrice"
    ));

    // the price fits, the line amount does not
    let mut pricey = line(&x, 2);
    pricey.unit_price = MAX_AMOUNT;
    let err = db
        .transactions()
        .create(&purchase(), &[pricey], None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::Validation(ValidationError::AmountOverflow { ref field }))
            if field == "items[0].amount"
    ));

    assert_eq!(count(&db, "transactions").await, 0);
    assert_eq!(count(&db, "transaction_items").await, 0);
    assert_eq!(db.inventory().get_quantity(&x.id).await.unwrap(), 0);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_posts_only_the_net_change() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 10).await;
    let clip = stocked_item(&db, "CLIP", 10).await;
    let tx = db
        .transactions()
        .create(&sale(), &[line(&pen, 4)], None)
        .await
        .unwrap();

    // pen 4 → 6 (two more leave), clip 0 → 3
    db.transactions()
        .update(&tx.id, &sale(), &[line(&pen, 6), line(&clip, 3)], Some("lee"))
        .await
        .unwrap();

    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 4);
    assert_eq!(db.inventory().get_quantity(&clip.id).await.unwrap(), 7);

    let pen_entry = &db.inventory().history(Some(&pen.id)).await.unwrap()[0];
    assert_eq!(pen_entry.change, -2);
    assert_eq!(pen_entry.transaction_type, InventoryChangeType::Sale);
    assert_eq!(pen_entry.notes.as_deref(), Some(NOTE_SALE_UPDATED));

    // pen 6 → 1 gives five back, clip removed gives three back
    db.transactions()
        .update(&tx.id, &sale(), &[line(&pen, 1)], None)
        .await
        .unwrap();

    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 9);
    assert_eq!(db.inventory().get_quantity(&clip.id).await.unwrap(), 10);
    let lines = db.transactions().items(&tx.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 1);
}

#[tokio::test]
async fn test_update_checks_only_the_additional_quantity() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 10).await;
    let tx = db
        .transactions()
        .create(&sale(), &[line(&pen, 8)], None)
        .await
        .unwrap();

    // 2 on hand: raising 8 → 10 is fine, 10 → 11 is not
    db.transactions()
        .update(&tx.id, &sale(), &[line(&pen, 10)], None)
        .await
        .unwrap();
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 0);

    let err = db
        .transactions()
        .update(&tx.id, &sale(), &[line(&pen, 11)], None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientStock { available: 0, requested: 1, .. })
    ));
    assert_eq!(db.transactions().items(&tx.id).await.unwrap()[0].quantity, 10);
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_changing_type_moves_stock_accordingly() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 10).await;
    let tx = db
        .transactions()
        .create(&sale(), &[line(&pen, 4)], None)
        .await
        .unwrap();

    db.transactions()
        .update(&tx.id, &purchase(), &[line(&pen, 4)], None)
        .await
        .unwrap();
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 10);

    db.transactions()
        .update(&tx.id, &sale(), &[line(&pen, 7)], None)
        .await
        .unwrap();
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 3);

    let reloaded = db.transactions().get_by_id(&tx.id).await.unwrap().unwrap();
    assert_eq!(reloaded.transaction.code, tx.code);
    assert_eq!(reloaded.transaction.transaction_type, TransactionType::Sale);
}

#[tokio::test]
async fn test_update_missing_transaction_is_not_found() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 10).await;

    let err = db
        .transactions()
        .update("missing", &sale(), &[line(&pen, 1)], None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Domain(CoreError::NotFound { entity: "transaction", .. })
    ));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_sale_restores_stock() {
    let db = test_db().await;
    let x = stocked_item(&db, "X", 10).await;
    let tx = db
        .transactions()
        .create(&sale(), &[line(&x, 4)], None)
        .await
        .unwrap();

    assert!(db.transactions().delete(&tx.id, Some("kim")).await.unwrap());

    assert_eq!(db.inventory().get_quantity(&x.id).await.unwrap(), 10);
    let entry = &db.inventory().history(Some(&x.id)).await.unwrap()[0];
    assert_eq!(entry.change, 4);
    assert_eq!(entry.transaction_type, InventoryChangeType::SaleCancel);
    assert_eq!(entry.notes.as_deref(), Some(NOTE_SALE_CANCELED));
    assert_eq!(entry.transaction_id.as_deref(), Some(tx.id.as_str()));

    assert!(db.transactions().get_by_id(&tx.id).await.unwrap().is_none());
    assert_eq!(count(&db, "transaction_items").await, 0);
}

#[tokio::test]
async fn test_delete_missing_returns_false() {
    let db = test_db().await;

    assert!(!db.transactions().delete("missing", None).await.unwrap());
}

#[tokio::test]
async fn test_delete_purchase_leaves_stock_alone() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 3).await;
    let tx = db
        .transactions()
        .create(&purchase(), &[line(&pen, 20)], None)
        .await
        .unwrap();
    let history_before = count(&db, "inventory_history").await;

    assert!(db.transactions().delete(&tx.id, None).await.unwrap());

    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 3);
    assert_eq!(count(&db, "inventory_history").await, history_before);
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_list_joins_partner_name_and_filters() {
    let db = test_db().await;
    let pen = stocked_item(&db, "PEN", 10).await;
    let customer = partner(&db, "C001").await;

    let mut draft = sale();
    draft.partner_id = Some(customer.id.clone());
    db.transactions().create(&draft, &[line(&pen, 1)], None).await.unwrap();
    db.transactions().create(&purchase(), &[line(&pen, 1)], None).await.unwrap();

    let all = db.transactions().list(&TransactionFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let sales = db
        .transactions()
        .list(&TransactionFilter {
            transaction_type: Some(TransactionType::Sale),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].partner_name.as_deref(), Some(customer.name.as_str()));

    let completed = db
        .transactions()
        .list(&TransactionFilter {
            transaction_type: None,
            status: Some(TransactionStatus::Completed),
        })
        .await
        .unwrap();
    assert!(completed.is_empty());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sales_never_oversell() {
    let path = std::env::temp_dir().join(format!("jangbu-{}.db", uuid::Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(4))
        .await
        .unwrap();
    let pen = stocked_item(&db, "PEN", 10).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = db.clone();
        let lines = vec![line(&pen, 3)];
        handles.push(tokio::spawn(async move {
            db.transactions().create(&sale(), &lines, None).await
        }));
    }

    let mut posted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => posted += 1,
            Err(DbError::Domain(CoreError::InsufficientStock { .. })) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(posted, 3);
    assert_eq!(db.inventory().get_quantity(&pen.id).await.unwrap(), 1);

    db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
