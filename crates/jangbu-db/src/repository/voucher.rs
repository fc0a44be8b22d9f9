//! # Voucher Poster
//!
//! Double-entry vouchers. Each line carries a signed amount: positive is a
//! debit, negative a credit.
//!
//! ## Create Checks (in order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. items non-empty                         → Validation (items)        │
//! │  2. per line: account exists                → InvalidReference          │
//! │              amount ≠ 0                     → Validation (amount)       │
//! │  3. Σ debit == Σ credit                     → UnbalancedVoucher         │
//! │  4. Σ debit == declared amount              → AmountMismatch            │
//! │  5. code  I|E|T + YYYYMMDD + -NNN           (daily sequence per prefix) │
//! │  6. INSERT voucher + lines                  (one scope)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status
//! ```text
//!   draft ──► confirmed ──► canceled
//!     └───────────────────────▲
//! ```
//! Status only changes through [`VoucherRepository::update_status`]; plain
//! `update` leaves it, and the balance, alone.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::account::fetch_account_on;
use crate::scope::AtomicScope;
use jangbu_core::document::{code_prefix, next_code};
use jangbu_core::money::Money;
use jangbu_core::validation::{validate_voucher_header, validate_voucher_lines};
use jangbu_core::voucher::{balance_lines, check_transition};
use jangbu_core::{
    CoreError, ValidationError, Voucher, VoucherDraft, VoucherFilter, VoucherItem,
    VoucherLineDraft, VoucherStatus, VoucherWithItems,
};

const VOUCHER_COLUMNS: &str = "id, code, voucher_date, voucher_type, amount, status, \
    description, created_by, created_at, updated_at";

/// Repository for double-entry vouchers.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    pool: SqlitePool,
}

impl VoucherRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VoucherRepository { pool }
    }

    /// Creates a balanced voucher with its lines. New vouchers start as drafts.
    pub async fn create(
        &self,
        draft: &VoucherDraft,
        lines: &[VoucherLineDraft],
        actor: Option<&str>,
    ) -> DbResult<VoucherWithItems> {
        validate_voucher_header(draft)?;
        validate_voucher_lines(lines)?;

        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = create_in(scope.conn(), draft, lines, actor).await;
        let voucher = scope.finish(result).await?;

        info!(
            id = %voucher.voucher.id,
            code = %voucher.voucher.code,
            amount = voucher.voucher.amount,
            "Voucher posted"
        );
        Ok(voucher)
    }

    /// Replaces header fields and, when given, the line set.
    ///
    /// The balance is not re-checked and the status is kept.
    pub async fn update(
        &self,
        id: &str,
        draft: &VoucherDraft,
        lines: Option<&[VoucherLineDraft]>,
    ) -> DbResult<VoucherWithItems> {
        validate_voucher_header(draft)?;
        if let Some(lines) = lines {
            validate_voucher_lines(lines)?;
        }

        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = update_in(scope.conn(), id, draft, lines).await;
        let voucher = scope.finish(result).await?;

        info!(id = %id, "Voucher updated");
        Ok(voucher)
    }

    /// Moves a voucher to `target` if its status machine allows it.
    pub async fn update_status(&self, id: &str, target: VoucherStatus) -> DbResult<Voucher> {
        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = update_status_in(scope.conn(), id, target).await;
        let voucher = scope.finish(result).await?;

        info!(id = %id, status = %voucher.status, "Voucher status changed");
        Ok(voucher)
    }

    /// Deletes a voucher and its lines. Returns `false` when it does not exist.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let mut scope = AtomicScope::open(&self.pool).await?;
        let result = delete_in(scope.conn(), id).await;
        let deleted = scope.finish(result).await?;

        if deleted {
            info!(id = %id, "Voucher deleted");
        }
        Ok(deleted)
    }

    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<VoucherWithItems>> {
        let mut conn = self.pool.acquire().await?;
        let Some(voucher) = fetch_voucher_on(&mut conn, id).await? else {
            return Ok(None);
        };
        let items = fetch_lines_on(&mut conn, id).await?;
        Ok(Some(VoucherWithItems { voucher, items }))
    }

    /// Lists vouchers newest-first, optionally filtered by type and status.
    pub async fn list(&self, filter: &VoucherFilter) -> DbResult<Vec<Voucher>> {
        let sql = format!(
            "SELECT {VOUCHER_COLUMNS}
             FROM vouchers
             WHERE (?1 IS NULL OR voucher_type = ?1)
               AND (?2 IS NULL OR status = ?2)
             ORDER BY voucher_date DESC, created_at DESC, code DESC"
        );

        let vouchers = sqlx::query_as::<_, Voucher>(&sql)
            .bind(filter.voucher_type)
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;

        Ok(vouchers)
    }
}

// =============================================================================
// Scope Bodies
// =============================================================================

async fn create_in(
    conn: &mut SqliteConnection,
    draft: &VoucherDraft,
    lines: &[VoucherLineDraft],
    actor: Option<&str>,
) -> DbResult<VoucherWithItems> {
    resolve_lines(conn, lines).await?;

    let amounts: Vec<Money> = lines.iter().map(|l| Money::from_won(l.amount)).collect();
    let totals = balance_lines(&amounts, Money::from_won(draft.amount))?;
    debug!(debit = %totals.debit, credit = %totals.credit, "Voucher balanced");

    let prefix = code_prefix(&draft.voucher_type, draft.voucher_date);
    let code = next_code(&prefix, last_code_on(conn, &prefix).await?.as_deref());
    let now = Utc::now();

    let voucher = Voucher {
        id: Uuid::new_v4().to_string(),
        code,
        voucher_date: draft.voucher_date,
        voucher_type: draft.voucher_type,
        amount: draft.amount,
        status: VoucherStatus::Draft,
        description: draft.description.clone(),
        created_by: actor.map(str::to_string),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO vouchers (
            id, code, voucher_date, voucher_type, amount, status,
            description, created_by, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&voucher.id)
    .bind(&voucher.code)
    .bind(voucher.voucher_date)
    .bind(voucher.voucher_type)
    .bind(voucher.amount)
    .bind(voucher.status)
    .bind(&voucher.description)
    .bind(&voucher.created_by)
    .bind(voucher.created_at)
    .bind(voucher.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", &voucher.code),
        other => other,
    })?;

    let items = insert_lines_on(conn, &voucher.id, lines).await?;
    Ok(VoucherWithItems { voucher, items })
}

async fn update_in(
    conn: &mut SqliteConnection,
    id: &str,
    draft: &VoucherDraft,
    lines: Option<&[VoucherLineDraft]>,
) -> DbResult<VoucherWithItems> {
    let existing = fetch_voucher_on(conn, id)
        .await?
        .ok_or_else(|| CoreError::not_found("voucher", id))?;

    let voucher = Voucher {
        voucher_date: draft.voucher_date,
        voucher_type: draft.voucher_type,
        amount: draft.amount,
        description: draft.description.clone(),
        updated_at: Utc::now(),
        ..existing
    };

    sqlx::query(
        r#"
        UPDATE vouchers SET
            voucher_date = ?2,
            voucher_type = ?3,
            amount = ?4,
            description = ?5,
            updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(voucher.voucher_date)
    .bind(voucher.voucher_type)
    .bind(voucher.amount)
    .bind(&voucher.description)
    .bind(voucher.updated_at)
    .execute(&mut *conn)
    .await?;

    let items = match lines {
        Some(lines) => {
            resolve_lines(conn, lines).await?;
            sqlx::query("DELETE FROM voucher_items WHERE voucher_id = ?1")
                .bind(id)
                .execute(&mut *conn)
                .await?;
            insert_lines_on(conn, id, lines).await?
        }
        None => fetch_lines_on(conn, id).await?,
    };

    Ok(VoucherWithItems { voucher, items })
}

async fn update_status_in(
    conn: &mut SqliteConnection,
    id: &str,
    target: VoucherStatus,
) -> DbResult<Voucher> {
    let existing = fetch_voucher_on(conn, id)
        .await?
        .ok_or_else(|| CoreError::not_found("voucher", id))?;

    check_transition(id, existing.status, target)?;

    let voucher = Voucher {
        status: target,
        updated_at: Utc::now(),
        ..existing
    };

    sqlx::query("UPDATE vouchers SET status = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(voucher.status)
        .bind(voucher.updated_at)
        .execute(&mut *conn)
        .await?;

    Ok(voucher)
}

async fn delete_in(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    sqlx::query("DELETE FROM voucher_items WHERE voucher_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let removed = sqlx::query("DELETE FROM vouchers WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(removed > 0)
}

// =============================================================================
// Helpers
// =============================================================================

/// Per line: the account must exist, then the amount must be non-zero.
async fn resolve_lines(conn: &mut SqliteConnection, lines: &[VoucherLineDraft]) -> DbResult<()> {
    for (i, line) in lines.iter().enumerate() {
        if fetch_account_on(conn, &line.account_id).await?.is_none() {
            return Err(CoreError::invalid_reference("account", &line.account_id).into());
        }
        if line.amount == 0 {
            return Err(ValidationError::MustBeNonZero {
                field: format!("items[{i}].amount"),
            }
            .into());
        }
    }
    Ok(())
}

async fn last_code_on(conn: &mut SqliteConnection, prefix: &str) -> DbResult<Option<String>> {
    let code: Option<String> = sqlx::query_scalar(
        r#"
        SELECT code FROM vouchers
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
    voucher_id: &str,
    lines: &[VoucherLineDraft],
) -> DbResult<Vec<VoucherItem>> {
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = VoucherItem {
            id: Uuid::new_v4().to_string(),
            voucher_id: voucher_id.to_string(),
            account_id: line.account_id.clone(),
            amount: line.amount,
            description: line.description.clone(),
        };

        sqlx::query(
            r#"
            INSERT INTO voucher_items (id, voucher_id, account_id, amount, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&item.id)
        .bind(&item.voucher_id)
        .bind(&item.account_id)
        .bind(item.amount)
        .bind(&item.description)
        .execute(&mut *conn)
        .await?;

        items.push(item);
    }
    Ok(items)
}

async fn fetch_voucher_on(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Voucher>> {
    let sql = format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = ?1");

    let voucher = sqlx::query_as::<_, Voucher>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(voucher)
}

async fn fetch_lines_on(conn: &mut SqliteConnection, voucher_id: &str) -> DbResult<Vec<VoucherItem>> {
    let items = sqlx::query_as::<_, VoucherItem>(
        r#"
        SELECT id, voucher_id, account_id, amount, description
        FROM voucher_items
        WHERE voucher_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(voucher_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}
