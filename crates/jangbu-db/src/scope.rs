//! # Atomic Scope
//!
//! One database transaction per posting. Every operation that writes more
//! than one table (document + lines, or document + lines + inventory +
//! history) runs inside exactly one `AtomicScope`.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  AtomicScope::open(pool)                                               │
//! │       │  BEGIN                                                          │
//! │       │  UPDATE ledger_lock ...    ← takes SQLite's write lock NOW      │
//! │       ▼                                                                 │
//! │  validation reads  (stock, accounts, existing lines)                    │
//! │  writes            (document, lines, inventory, history)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  scope.finish(result)                                                  │
//! │       ├── Ok  → COMMIT   (all writes visible together)                  │
//! │       └── Err → ROLLBACK (nothing visible), error returned as-is        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why the lock row
//! A plain `BEGIN` is deferred: two scopes could both read the same
//! on-hand quantity before either writes, and the second commit would
//! overwrite the first. Writing `ledger_lock` as the first statement makes
//! each scope acquire the write lock before its first validation read, so
//! concurrent postings run one after another and each sees the previous
//! one's committed quantities.
//!
//! ## Rules
//! - Never nested: posting code receives `&mut SqliteConnection` from the
//!   scope and never opens another scope or touches the pool.
//! - Dropping a scope without `finish` rolls back.

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, warn};

use crate::error::DbResult;

/// An open database transaction holding the ledger write lock.
pub struct AtomicScope {
    tx: Transaction<'static, Sqlite>,
}

impl AtomicScope {
    /// Begins a transaction and claims the write lock.
    pub async fn open(pool: &SqlitePool) -> DbResult<Self> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE ledger_lock SET claimed_at = ?1 WHERE id = 1")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        debug!("Atomic scope opened");
        Ok(AtomicScope { tx })
    }

    /// The connection every statement of this scope must run on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Commits on `Ok`, rolls back on `Err`, and returns `result`.
    ///
    /// A failed commit replaces an `Ok` with the commit error.
    pub async fn finish<T>(self, result: DbResult<T>) -> DbResult<T> {
        match result {
            Ok(value) => {
                self.tx.commit().await?;
                debug!("Atomic scope committed");
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "Atomic scope rolled back");
                if let Err(rollback_err) = self.tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed; connection will discard the transaction");
                }
                Err(err)
            }
        }
    }
}
