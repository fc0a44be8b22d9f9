//! # Inventory Ledger
//!
//! Current on-hand quantity per item (`inventory`) plus an append-only
//! history of every change (`inventory_history`).
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust_on(conn, item X, delta -4, "sale", tx-1, "판매/출고 등록")      │
//! │                                                                         │
//! │   1. before = SELECT quantity FROM inventory WHERE item_id = X  (→ 10)  │
//! │              (no row → 0)                                               │
//! │   2. after  = before + delta  (checked)                         (→ 6)   │
//! │   3. UPSERT inventory (X, 6)                                            │
//! │   4. INSERT inventory_history { before: 10, after: 6, change: -4 }      │
//! │                                                                         │
//! │   All on the caller's connection, inside the caller's AtomicScope.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `adjust_on` has no floor: it will happily write a negative quantity.
//! Sale postings run their own stock pre-check before calling it; manual
//! adjustments may go negative.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::catalog::fetch_item_on;
use crate::scope::AtomicScope;
use jangbu_core::validation::{validate_adjustment, validate_note};
use jangbu_core::ValidationError;
use jangbu_core::{
    CoreError, InventoryChangeType, InventoryHistoryEntry, InventoryRecord, Item, StockLevel,
};

// =============================================================================
// Ledger primitives (run inside a scope)
// =============================================================================

/// One signed change to apply to an item's on-hand quantity.
#[derive(Debug, Clone, Copy)]
pub struct StockAdjustment<'a> {
    pub item_id: &'a str,
    pub delta: i64,
    pub change_type: InventoryChangeType,
    pub transaction_id: Option<&'a str>,
    pub note: Option<&'a str>,
    pub actor: Option<&'a str>,
}

/// Current on-hand quantity, 0 when the item has no inventory row.
pub async fn quantity_on(conn: &mut SqliteConnection, item_id: &str) -> DbResult<i64> {
    let quantity: Option<i64> =
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE item_id = ?1")
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(quantity.unwrap_or(0))
}

/// Applies `adjustment` and appends its history entry.
///
/// Must run on a scope's connection so the quantity write and the history
/// entry commit (or vanish) together with the caller's other writes.
pub async fn adjust_on(
    conn: &mut SqliteConnection,
    adjustment: StockAdjustment<'_>,
) -> DbResult<InventoryHistoryEntry> {
    let before = quantity_on(conn, adjustment.item_id).await?;
    let after = before
        .checked_add(adjustment.delta)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: i64::MIN,
            max: i64::MAX,
        })?;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO inventory (item_id, quantity, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (item_id) DO UPDATE SET
            quantity = excluded.quantity,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(adjustment.item_id)
    .bind(after)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let entry = InventoryHistoryEntry {
        id: Uuid::new_v4().to_string(),
        item_id: adjustment.item_id.to_string(),
        transaction_type: adjustment.change_type,
        transaction_id: adjustment.transaction_id.map(str::to_string),
        quantity_before: before,
        quantity_after: after,
        change: adjustment.delta,
        notes: adjustment.note.map(str::to_string),
        created_by: adjustment.actor.map(str::to_string),
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO inventory_history (
            id, item_id, transaction_type, transaction_id,
            quantity_before, quantity_after, change, notes, created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.item_id)
    .bind(entry.transaction_type)
    .bind(&entry.transaction_id)
    .bind(entry.quantity_before)
    .bind(entry.quantity_after)
    .bind(entry.change)
    .bind(&entry.notes)
    .bind(&entry.created_by)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;

    debug!(
        item_id = %entry.item_id,
        change_type = ?entry.transaction_type,
        before,
        after,
        "Inventory adjusted"
    );

    Ok(entry)
}

async fn record_on(conn: &mut SqliteConnection, item_id: &str) -> DbResult<Option<InventoryRecord>> {
    let record = sqlx::query_as::<_, InventoryRecord>(
        "SELECT item_id, quantity, updated_at FROM inventory WHERE item_id = ?1",
    )
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(record)
}

// =============================================================================
// Repository
// =============================================================================

/// Result of a manual adjustment: `{ item, stock, history }`.
#[derive(Debug, Clone, Serialize)]
pub struct ManualAdjustment {
    pub item: Item,
    pub stock: InventoryRecord,
    pub history: InventoryHistoryEntry,
}

/// Repository for on-hand quantities and their history.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Current on-hand quantity, 0 if the item has never moved.
    pub async fn get_quantity(&self, item_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        quantity_on(&mut conn, item_id).await
    }

    /// History entries newest-first, for one item or for all items.
    pub async fn history(&self, item_id: Option<&str>) -> DbResult<Vec<InventoryHistoryEntry>> {
        let entries = sqlx::query_as::<_, InventoryHistoryEntry>(
            r#"
            SELECT id, item_id, transaction_type, transaction_id,
                   quantity_before, quantity_after, change, notes, created_by, created_at
            FROM inventory_history
            WHERE ?1 IS NULL OR item_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Manually adjusts an item's stock by a signed `delta`.
    ///
    /// No floor check: the quantity may go negative.
    pub async fn adjust(
        &self,
        item_id: &str,
        delta: i64,
        notes: Option<&str>,
        actor: Option<&str>,
    ) -> DbResult<ManualAdjustment> {
        validate_adjustment(delta)?;
        validate_note("notes", notes)?;

        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = adjust_in(scope.conn(), item_id, delta, notes, actor).await;
        let adjustment = scope.finish(result).await?;

        info!(
            item_id = %item_id,
            delta,
            quantity = adjustment.stock.quantity,
            "Manual inventory adjustment"
        );
        Ok(adjustment)
    }

    /// On-hand quantity of every item, including items that never moved.
    pub async fn stock_levels(&self) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT i.id AS item_id, i.code, i.name, i.unit, i.min_stock,
                   COALESCE(inv.quantity, 0) AS quantity
            FROM items i
            LEFT JOIN inventory inv ON inv.item_id = i.id
            WHERE i.is_active = 1
            ORDER BY i.code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Active items whose on-hand quantity is below their minimum.
    pub async fn low_stock(&self) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT i.id AS item_id, i.code, i.name, i.unit, i.min_stock,
                   COALESCE(inv.quantity, 0) AS quantity
            FROM items i
            LEFT JOIN inventory inv ON inv.item_id = i.id
            WHERE i.is_active = 1
              AND COALESCE(inv.quantity, 0) < i.min_stock
            ORDER BY (i.min_stock - COALESCE(inv.quantity, 0)) DESC, i.code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }
}

async fn adjust_in(
    conn: &mut SqliteConnection,
    item_id: &str,
    delta: i64,
    notes: Option<&str>,
    actor: Option<&str>,
) -> DbResult<ManualAdjustment> {
    let item = fetch_item_on(conn, item_id)
        .await?
        .ok_or_else(|| CoreError::not_found("item", item_id))?;

    let history = adjust_on(
        conn,
        StockAdjustment {
            item_id,
            delta,
            change_type: InventoryChangeType::Adjustment,
            transaction_id: None,
            note: notes,
            actor,
        },
    )
    .await?;

    let stock = record_on(conn, item_id)
        .await?
        .ok_or_else(|| CoreError::not_found("inventory", item_id))?;

    Ok(ManualAdjustment {
        item,
        stock,
        history,
    })
}
