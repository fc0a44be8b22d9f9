//! # jangbu-core: Pure Business Logic for Jangbu
//!
//! The rules of the ledger, as pure functions with zero I/O dependencies.
//! Everything that decides whether a posting is allowed lives here; the
//! database crate only decides *how* it is stored.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Jangbu Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                       │   │
//! │  │   /transactions   /accounting/vouchers   /inventory            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ jangbu-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  stock  │ │ voucher │ │document │  │   │
//! │  │   │  Item   │ │  Money  │ │  diffs  │ │ balance │ │  codes  │  │   │
//! │  │   │ Voucher │ │ TaxRate │ │ pre-chk │ │ status  │ │ S/P/I/E │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   jangbu-db (Database Layer)                    │   │
//! │  │        atomic scopes, inventory ledger, posting repositories    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Transaction, Voucher, Account, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Field and draft validation
//! - [`stock`] - Per-item quantity maps, update diffs, stock pre-check
//! - [`voucher`] - Debit/credit balance and the status machine
//! - [`document`] - Daily-sequenced document codes
//!
//! ## Example Usage
//!
//! ```rust
//! use jangbu_core::money::Money;
//! use jangbu_core::voucher::balance_lines;
//!
//! let lines = [Money::from_won(1000), Money::from_won(-1000)];
//! let totals = balance_lines(&lines, Money::from_won(1000)).unwrap();
//! assert_eq!(totals.debit, Money::from_won(1000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;
pub mod voucher;

#[cfg(test)]
mod voucher_props;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items on a single transaction or voucher.
///
/// Keeps one posting inside a single short database transaction.
pub const MAX_DOCUMENT_LINES: usize = 200;

/// Maximum quantity on a single transaction line.
///
/// Catches typos such as an extra zero before they hit inventory.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Largest magnitude of any single amount in won (1,000조).
///
/// Prices, tax, declared totals and voucher lines are bounded by it, and
/// every sum over them is checked, so `i64` arithmetic never wraps.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Inventory history note for a posted sale.
pub const NOTE_SALE_POSTED: &str = "판매/출고 등록";

/// Inventory history note for an edited sale.
pub const NOTE_SALE_UPDATED: &str = "판매/출고 수정";

/// Inventory history note for a deleted sale.
pub const NOTE_SALE_CANCELED: &str = "판매/출고 취소";
