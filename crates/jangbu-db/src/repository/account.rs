//! # Account Repository
//!
//! Chart of accounts. Voucher lines reference accounts by id; the voucher
//! poster resolves them inside its scope with [`fetch_account_on`].

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use jangbu_core::validation::validate_new_account;
use jangbu_core::{Account, NewAccount};

/// Repository for chart-of-accounts entries.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Creates an account. Duplicate codes fail with `UniqueViolation`.
    pub async fn create(&self, input: &NewAccount) -> DbResult<Account> {
        validate_new_account(input)?;

        let account = Account {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            account_type: input.account_type,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %account.id, code = %account.code, "Creating account");

        sqlx::query(
            r#"
            INSERT INTO accounts (id, code, name, account_type, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&account.id)
        .bind(&account.code)
        .bind(&account.name)
        .bind(account.account_type)
        .bind(account.is_active)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &account.code),
            other => other,
        })?;

        Ok(account)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let mut conn = self.pool.acquire().await?;
        fetch_account_on(&mut conn, id).await
    }

    /// Lists accounts ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, code, name, account_type, is_active, created_at
            FROM accounts
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Loads an account on the given connection.
pub(crate) async fn fetch_account_on(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, code, name, account_type, is_active, created_at
        FROM accounts
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(account)
}
