//! # Domain Types
//!
//! Core domain types used throughout Jangbu.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │      Item       │   │ InventoryRecord  │   │ InventoryHistory│      │
//! │  │  ─────────────  │◄──│  ──────────────  │◄──│  ─────────────  │      │
//! │  │  id, code       │   │  item_id (PK)    │   │  before / after │      │
//! │  │  min_stock      │   │  quantity        │   │  change, note   │      │
//! │  └────────▲────────┘   └──────────────────┘   └─────────────────┘      │
//! │           │                                                             │
//! │  ┌────────┴────────┐   ┌─────────────────┐                              │
//! │  │ TransactionItem │──►│   Transaction   │──► Partner                   │
//! │  │ qty × unit_price│   │  sale/purchase  │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │   VoucherItem   │──►│     Voucher     │   Σ debit == Σ credit        │
//! │  │ +debit/-credit  │   │  I / E / T      │   == declared amount         │
//! │  └────────┬────────┘   └─────────────────┘                              │
//! │           ▼                                                             │
//! │        Account                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `code`: human-readable business key (item code, `S20261016-001`, ...)
//!
//! JSON uses camelCase field names for the web client; the `*_type` fields
//! of documents serialize as `type`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so Korean VAT (10%) is 1000 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Standard VAT rate (10%).
    pub const VAT: TaxRate = TaxRate(1000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable/purchasable product.
///
/// Managed by the catalog; the posting engine only references items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    /// Business identifier, unique.
    pub code: String,
    pub name: String,
    pub category_id: Option<String>,
    pub unit_price: i64,
    pub cost_price: i64,
    /// Unit label (EA, BOX, kg).
    pub unit: Option<String>,
    /// Low-stock alert threshold.
    pub min_stock: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_won(self.unit_price)
    }
}

/// Catalog input for a new item.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub code: String,
    pub name: String,
    pub category_id: Option<String>,
    #[serde(default)]
    pub unit_price: i64,
    #[serde(default)]
    pub cost_price: i64,
    pub unit: Option<String>,
    #[serde(default)]
    pub min_stock: i64,
}

// =============================================================================
// Partner
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PartnerType {
    Customer,
    Supplier,
    Both,
}

/// A customer or supplier (거래처).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub code: String,
    pub name: String,
    pub partner_type: PartnerType,
    pub business_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    pub code: String,
    pub name: String,
    pub partner_type: PartnerType,
    pub business_number: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Inventory
// =============================================================================

/// Current on-hand quantity of one item. Absent row means zero.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub item_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// What caused an inventory change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InventoryChangeType {
    Purchase,
    Sale,
    SaleCancel,
    Adjustment,
}

/// Immutable audit record of one inventory change.
///
/// Invariant: `quantity_after == quantity_before + change`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryHistoryEntry {
    pub id: String,
    pub item_id: String,
    pub transaction_type: InventoryChangeType,
    /// Source transaction, if the change came from a posting.
    pub transaction_id: Option<String>,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub change: i64,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// On-hand quantity joined with item details.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub item_id: String,
    pub code: String,
    pub name: String,
    pub unit: Option<String>,
    pub min_stock: i64,
    pub quantity: i64,
}

impl StockLevel {
    #[inline]
    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.min_stock
    }
}

// =============================================================================
// Transaction (sale / purchase document)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Sale,
    Purchase,
}

impl TransactionType {
    #[inline]
    pub fn moves_inventory(&self) -> bool {
        matches!(self, TransactionType::Sale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Partial,
    Canceled,
    Unpaid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub code: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub partner_id: Option<String>,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    pub status: TransactionStatus,
    pub total_amount: i64,
    pub tax_amount: i64,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A transaction with its partner's name joined in (list view).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub transaction: Transaction,
    pub partner_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: i64,
    /// quantity × unit_price
    pub amount: i64,
    pub tax_amount: i64,
    pub tax_rate_bps: u32,
    pub description: Option<String>,
}

/// Header of a transaction as submitted by a client.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub partner_id: Option<String>,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    pub status: Option<TransactionStatus>,
    /// Defaults to Σ(line amount + line tax).
    pub total_amount: Option<i64>,
    /// Defaults to Σ line tax.
    pub tax_amount: Option<i64>,
    pub notes: Option<String>,
}

/// One line of a transaction as submitted by a client.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLineDraft {
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub tax_rate_bps: Option<u32>,
    /// Explicit tax; computed from the rate when absent.
    pub tax_amount: Option<i64>,
    pub description: Option<String>,
}

/// List filters for `GET /transactions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
}

// =============================================================================
// Account (chart of accounts)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
}

// =============================================================================
// Voucher (전표)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    Income,
    Expense,
    Transfer,
}

/// Voucher lifecycle.
///
/// ```text
///   draft ──────► confirmed ──────► canceled (terminal)
///     │                                 ▲
///     └─────────────────────────────────┘
/// ```
///
/// `pending` and `approved` are accepted on input as aliases of `draft`
/// and `confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    #[default]
    #[serde(alias = "pending")]
    Draft,
    #[serde(alias = "approved")]
    Confirmed,
    Rejected,
    Canceled,
}

impl VoucherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherStatus::Draft => "draft",
            VoucherStatus::Confirmed => "confirmed",
            VoucherStatus::Rejected => "rejected",
            VoucherStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: String,
    pub code: String,
    #[ts(as = "String")]
    pub voucher_date: NaiveDate,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    /// Declared amount; equals the debit (and credit) total at creation.
    pub amount: i64,
    pub status: VoucherStatus,
    pub description: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// One side of a voucher entry: positive = debit, negative = credit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherItem {
    pub id: String,
    pub voucher_id: String,
    pub account_id: String,
    pub amount: i64,
    pub description: Option<String>,
}

impl VoucherItem {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_won(self.amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherWithItems {
    #[serde(flatten)]
    pub voucher: Voucher,
    pub items: Vec<VoucherItem>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherDraft {
    #[ts(as = "String")]
    pub voucher_date: NaiveDate,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub amount: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherLineDraft {
    pub account_id: String,
    pub amount: i64,
    pub description: Option<String>,
}

/// List filters for `GET /accounting/vouchers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoucherFilter {
    #[serde(rename = "type")]
    pub voucher_type: Option<VoucherType>,
    pub status: Option<VoucherStatus>,
}

// =============================================================================
// User Activity (audit log)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub id: String,
    pub user_id: String,
    /// create, update, delete, status, adjust
    pub action: String,
    /// transactions, vouchers, inventory, ...
    pub resource: String,
    pub resource_id: Option<String>,
    /// JSON text with operation-specific detail.
    pub details: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
