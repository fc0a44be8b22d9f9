//! # jangbu-db: Database Layer and Posting Engine
//!
//! SQLite persistence for Jangbu with sqlx. Besides plain CRUD this crate
//! owns the write path of the ledger: every posting runs inside exactly one
//! [`AtomicScope`], so a document, its lines, the stock it moves and the
//! history of that movement commit together or not at all.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Jangbu Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /transactions)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     jangbu-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Posters    │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ transaction   │    │  (embedded)  │  │   │
//! │  │   │               │    │ voucher       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ inventory     │    │ 001_initial  │  │   │
//! │  │   │ AtomicScope   │    │ catalog, ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`scope`] - One database transaction per posting
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog, accounts, inventory ledger, posters, audit log
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jangbu_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("jangbu.db")).await?;
//!
//! let sale = db.transactions().create(&draft, &lines, Some("kim")).await?;
//! let on_hand = db.inventory().get_quantity(&item_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod scope;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use scope::AtomicScope;

pub use repository::account::AccountRepository;
pub use repository::activity::{ActivityRecord, ActivityRepository};
pub use repository::catalog::{ItemRepository, PartnerRepository};
pub use repository::inventory::{InventoryRepository, ManualAdjustment};
pub use repository::transaction::TransactionRepository;
pub use repository::voucher::VoucherRepository;
