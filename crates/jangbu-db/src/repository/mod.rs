//! # Repository Module
//!
//! Persistence for the ledger: plain catalog repositories plus the two
//! posters that write several tables per call.
//!
//! ## Who Opens Scopes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │  db.transactions().create(draft, lines, actor)                  │
//! │       ▼                                                                 │
//! │  TransactionRepository ── opens ONE AtomicScope ──┐                     │
//! │       │                                           │ &mut conn           │
//! │       ├── catalog::fetch_item_on(conn)     ◄──────┤                     │
//! │       ├── inventory::quantity_on(conn)     ◄──────┤                     │
//! │       └── inventory::adjust_on(conn)       ◄──────┘                     │
//! │                                                                         │
//! │  The `*_on` functions never open a scope of their own; they run on      │
//! │  whatever connection the poster hands them.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`](catalog::ItemRepository) / [`PartnerRepository`](catalog::PartnerRepository) - Catalog CRUD
//! - [`AccountRepository`](account::AccountRepository) - Chart of accounts
//! - [`InventoryRepository`](inventory::InventoryRepository) - On-hand quantities and history
//! - [`TransactionRepository`](transaction::TransactionRepository) - Sale/purchase poster
//! - [`VoucherRepository`](voucher::VoucherRepository) - Double-entry voucher poster
//! - [`ActivityRepository`](activity::ActivityRepository) - Audit log

pub mod account;
pub mod activity;
pub mod catalog;
pub mod inventory;
pub mod transaction;
pub mod voucher;
