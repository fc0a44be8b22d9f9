//! # Transaction Poster
//!
//! Sale and purchase documents with their line items. Sales move stock
//! through the inventory ledger; purchases only record the document.
//!
//! ## Posting a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(draft{type: sale}, lines)                                       │
//! │                                                                         │
//! │   validate_transaction (shape only, no I/O)                             │
//! │        │                                                                │
//! │        ▼  AtomicScope::open                                             │
//! │   resolve items + partner ──── missing → InvalidReference               │
//! │        │                                                                │
//! │   pre-check: per item Σ quantity ≤ on hand ── else InsufficientStock    │
//! │        │                                                                │
//! │   INSERT transactions (code S20261016-NNN)                              │
//! │   INSERT transaction_items × n                                          │
//! │   adjust_on(item, -qty, sale, "판매/출고 등록") × n                     │
//! │        │                                                                │
//! │        ▼  scope.finish → COMMIT (or ROLLBACK on any error above)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Editing
//! `update` replaces the line set wholesale. The stock effect is the diff
//! between the old and new outgoing quantities (a non-sale side counts as
//! zero), so only the net change is checked and posted.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::catalog::{fetch_item_on, fetch_partner_on};
use crate::repository::inventory::{adjust_on, quantity_on, StockAdjustment};
use crate::scope::AtomicScope;
use jangbu_core::document::{code_prefix, next_code, price_lines, transaction_totals, PricedLine};
use jangbu_core::stock::{check_available, diff_quantities, outgoing_quantities};
use jangbu_core::validation::validate_transaction;
use jangbu_core::{
    CoreError, InventoryChangeType, Item, Transaction, TransactionDraft, TransactionFilter,
    TransactionItem, TransactionLineDraft, TransactionSummary, NOTE_SALE_CANCELED,
    NOTE_SALE_POSTED, NOTE_SALE_UPDATED,
};

const TRANSACTION_COLUMNS: &str = "t.id, t.code, t.transaction_type, t.partner_id, \
    t.transaction_date, t.status, t.total_amount, t.tax_amount, t.notes, \
    t.created_by, t.created_at, t.updated_at";

/// Repository for sale/purchase documents.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    // =========================================================================
    // Postings
    // =========================================================================

    /// Creates a transaction with its lines; a sale also takes the stock.
    pub async fn create(
        &self,
        draft: &TransactionDraft,
        lines: &[TransactionLineDraft],
        actor: Option<&str>,
    ) -> DbResult<Transaction> {
        validate_transaction(draft, lines)?;

        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = create_in(scope.conn(), draft, lines, actor).await;
        let transaction = scope.finish(result).await?;

        info!(
            id = %transaction.id,
            code = %transaction.code,
            transaction_type = ?transaction.transaction_type,
            lines = lines.len(),
            "Transaction posted"
        );
        Ok(transaction)
    }

    /// Replaces the header and the whole line set, posting the net stock change.
    pub async fn update(
        &self,
        id: &str,
        draft: &TransactionDraft,
        lines: &[TransactionLineDraft],
        actor: Option<&str>,
    ) -> DbResult<Transaction> {
        validate_transaction(draft, lines)?;

        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = update_in(scope.conn(), id, draft, lines, actor).await;
        let transaction = scope.finish(result).await?;

        info!(id = %transaction.id, code = %transaction.code, "Transaction updated");
        Ok(transaction)
    }

    /// Deletes a transaction; a sale gives its stock back.
    ///
    /// Returns `false` when no such transaction exists.
    pub async fn delete(&self, id: &str, actor: Option<&str>) -> DbResult<bool> {
        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = delete_in(scope.conn(), id, actor).await;
        let deleted = scope.finish(result).await?;

        if deleted {
            info!(id = %id, "Transaction deleted");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Loads a transaction with its partner's name.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TransactionSummary>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS}, p.name AS partner_name
             FROM transactions t
             LEFT JOIN partners p ON p.id = t.partner_id
             WHERE t.id = ?1"
        );

        let summary = sqlx::query_as::<_, TransactionSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(summary)
    }

    /// Line items of a transaction, in insertion order.
    pub async fn items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_lines_on(&mut conn, transaction_id).await
    }

    /// Lists transactions newest-first, optionally filtered by type and status.
    pub async fn list(&self, filter: &TransactionFilter) -> DbResult<Vec<TransactionSummary>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS}, p.name AS partner_name
             FROM transactions t
             LEFT JOIN partners p ON p.id = t.partner_id
             WHERE (?1 IS NULL OR t.transaction_type = ?1)
               AND (?2 IS NULL OR t.status = ?2)
             ORDER BY t.transaction_date DESC, t.created_at DESC, t.code DESC"
        );

        let transactions = sqlx::query_as::<_, TransactionSummary>(&sql)
            .bind(filter.transaction_type)
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;

        Ok(transactions)
    }
}

// =============================================================================
// Scope Bodies
// =============================================================================

async fn create_in(
    conn: &mut SqliteConnection,
    draft: &TransactionDraft,
    lines: &[TransactionLineDraft],
    actor: Option<&str>,
) -> DbResult<Transaction> {
    resolve_partner(conn, draft.partner_id.as_deref()).await?;
    let items = resolve_items(conn, lines).await?;

    let outgoing = outgoing_quantities(
        draft.transaction_type,
        lines.iter().map(|l| (l.item_id.as_str(), l.quantity)),
    );
    for (item_id, requested) in &outgoing {
        let available = quantity_on(conn, item_id).await?;
        check_available(item_id, item_name(&items, item_id), available, *requested)?;
    }

    let prefix = code_prefix(&draft.transaction_type, draft.transaction_date);
    let code = next_code(&prefix, last_code_on(conn, &prefix).await?.as_deref());

    let priced = price_lines(lines)?;
    let totals = transaction_totals(draft, &priced)?;
    let now = Utc::now();

    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        code,
        transaction_type: draft.transaction_type,
        partner_id: draft.partner_id.clone(),
        transaction_date: draft.transaction_date,
        status: draft.status.unwrap_or_default(),
        total_amount: totals.total.won(),
        tax_amount: totals.tax.won(),
        notes: draft.notes.clone(),
        created_by: actor.map(str::to_string),
        created_at: now,
        updated_at: now,
    };

    debug!(id = %transaction.id, code = %transaction.code, "Inserting transaction");

    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, code, transaction_type, partner_id, transaction_date, status,
            total_amount, tax_amount, notes, created_by, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.code)
    .bind(transaction.transaction_type)
    .bind(&transaction.partner_id)
    .bind(transaction.transaction_date)
    .bind(transaction.status)
    .bind(transaction.total_amount)
    .bind(transaction.tax_amount)
    .bind(&transaction.notes)
    .bind(&transaction.created_by)
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", &transaction.code),
        other => other,
    })?;

    insert_lines_on(conn, &transaction.id, lines, &priced).await?;

    if transaction.transaction_type.moves_inventory() {
        for line in lines {
            adjust_on(
                conn,
                StockAdjustment {
                    item_id: &line.item_id,
                    delta: -line.quantity,
                    change_type: InventoryChangeType::Sale,
                    transaction_id: Some(&transaction.id),
                    note: Some(NOTE_SALE_POSTED),
                    actor,
                },
            )
            .await?;
        }
    }

    Ok(transaction)
}

async fn update_in(
    conn: &mut SqliteConnection,
    id: &str,
    draft: &TransactionDraft,
    lines: &[TransactionLineDraft],
    actor: Option<&str>,
) -> DbResult<Transaction> {
    let existing = fetch_transaction_on(conn, id)
        .await?
        .ok_or_else(|| CoreError::not_found("transaction", id))?;
    let old_lines = fetch_lines_on(conn, id).await?;

    resolve_partner(conn, draft.partner_id.as_deref()).await?;
    let items = resolve_items(conn, lines).await?;

    let old = outgoing_quantities(
        existing.transaction_type,
        old_lines.iter().map(|l| (l.item_id.as_str(), l.quantity)),
    );
    let new = outgoing_quantities(
        draft.transaction_type,
        lines.iter().map(|l| (l.item_id.as_str(), l.quantity)),
    );
    let diffs = diff_quantities(&old, &new);

    for diff in diffs.iter().filter(|d| d.diff() > 0) {
        let available = quantity_on(conn, &diff.item_id).await?;
        check_available(
            &diff.item_id,
            item_name(&items, &diff.item_id),
            available,
            diff.diff(),
        )?;
    }

    let priced = price_lines(lines)?;
    let totals = transaction_totals(draft, &priced)?;

    let transaction = Transaction {
        transaction_type: draft.transaction_type,
        partner_id: draft.partner_id.clone(),
        transaction_date: draft.transaction_date,
        status: draft.status.unwrap_or(existing.status),
        total_amount: totals.total.won(),
        tax_amount: totals.tax.won(),
        notes: draft.notes.clone(),
        updated_at: Utc::now(),
        ..existing
    };

    sqlx::query(
        r#"
        UPDATE transactions SET
            transaction_type = ?2,
            partner_id = ?3,
            transaction_date = ?4,
            status = ?5,
            total_amount = ?6,
            tax_amount = ?7,
            notes = ?8,
            updated_at = ?9
        WHERE id = ?1
        "#,
    )
    .bind(&transaction.id)
    .bind(transaction.transaction_type)
    .bind(&transaction.partner_id)
    .bind(transaction.transaction_date)
    .bind(transaction.status)
    .bind(transaction.total_amount)
    .bind(transaction.tax_amount)
    .bind(&transaction.notes)
    .bind(transaction.updated_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM transaction_items WHERE transaction_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    insert_lines_on(conn, id, lines, &priced).await?;

    for diff in &diffs {
        adjust_on(
            conn,
            StockAdjustment {
                item_id: &diff.item_id,
                delta: diff.ledger_delta(),
                change_type: InventoryChangeType::Sale,
                transaction_id: Some(id),
                note: Some(NOTE_SALE_UPDATED),
                actor,
            },
        )
        .await?;
    }

    debug!(id = %id, stock_changes = diffs.len(), "Transaction lines replaced");
    Ok(transaction)
}

async fn delete_in(conn: &mut SqliteConnection, id: &str, actor: Option<&str>) -> DbResult<bool> {
    let Some(existing) = fetch_transaction_on(conn, id).await? else {
        return Ok(false);
    };
    let lines = fetch_lines_on(conn, id).await?;

    sqlx::query("DELETE FROM transaction_items WHERE transaction_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let removed = sqlx::query("DELETE FROM transactions WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if existing.transaction_type.moves_inventory() {
        for line in &lines {
            adjust_on(
                conn,
                StockAdjustment {
                    item_id: &line.item_id,
                    delta: line.quantity,
                    change_type: InventoryChangeType::SaleCancel,
                    transaction_id: Some(id),
                    note: Some(NOTE_SALE_CANCELED),
                    actor,
                },
            )
            .await?;
        }
    }

    Ok(removed > 0)
}

// =============================================================================
// Helpers
// =============================================================================

async fn resolve_partner(conn: &mut SqliteConnection, partner_id: Option<&str>) -> DbResult<()> {
    if let Some(partner_id) = partner_id {
        if fetch_partner_on(conn, partner_id).await?.is_none() {
            return Err(CoreError::invalid_reference("partner", partner_id).into());
        }
    }
    Ok(())
}

/// Loads every item the lines reference, failing on the first unknown one.
async fn resolve_items(
    conn: &mut SqliteConnection,
    lines: &[TransactionLineDraft],
) -> DbResult<Vec<Item>> {
    let mut items: Vec<Item> = Vec::with_capacity(lines.len());
    for line in lines {
        if items.iter().any(|i| i.id == line.item_id) {
            continue;
        }
        let item = fetch_item_on(conn, &line.item_id)
            .await?
            .ok_or_else(|| CoreError::invalid_reference("item", &line.item_id))?;
        items.push(item);
    }
    Ok(items)
}

fn item_name<'a>(items: &'a [Item], item_id: &'a str) -> &'a str {
    items
        .iter()
        .find(|i| i.id == item_id)
        .map(|i| i.name.as_str())
        .unwrap_or(item_id)
}

/// Highest existing code with `prefix`, by sequence length then value.
async fn last_code_on(conn: &mut SqliteConnection, prefix: &str) -> DbResult<Option<String>> {
    let code: Option<String> = sqlx::query_scalar(
        r#"
        SELECT code FROM transactions
        WHERE code LIKE ?1 || '%'
        ORDER BY length(code) DESC, code DESC
        LIMIT 1
        "#,
    )
    .bind(prefix)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(code)
}

async fn insert_lines_on(
    conn: &mut SqliteConnection,
    transaction_id: &str,
    lines: &[TransactionLineDraft],
    priced: &[PricedLine],
) -> DbResult<()> {
    for (line, priced) in lines.iter().zip(priced) {

        sqlx::query(
            r#"
            INSERT INTO transaction_items (
                id, transaction_id, item_id, quantity, unit_price,
                amount, tax_amount, tax_rate_bps, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(transaction_id)
        .bind(&line.item_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(priced.amount.won())
        .bind(priced.tax.won())
        .bind(priced.tax_rate.bps())
        .bind(&line.description)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn fetch_transaction_on(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Transaction>> {
    let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.id = ?1");

    let transaction = sqlx::query_as::<_, Transaction>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(transaction)
}

async fn fetch_lines_on(
    conn: &mut SqliteConnection,
    transaction_id: &str,
) -> DbResult<Vec<TransactionItem>> {
    let lines = sqlx::query_as::<_, TransactionItem>(
        r#"
        SELECT id, transaction_id, item_id, quantity, unit_price,
               amount, tax_amount, tax_rate_bps, description
        FROM transaction_items
        WHERE transaction_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(transaction_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lines)
}
