//! Shared fixtures for the database integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use jangbu_core::{
    Account, AccountType, Item, NewAccount, NewItem, NewPartner, Partner, PartnerType,
    TransactionDraft, TransactionLineDraft, TransactionType, VoucherDraft, VoucherLineDraft,
    VoucherType,
};
use jangbu_db::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn item(db: &Database, code: &str) -> Item {
    db.items()
        .create(&NewItem {
            code: code.to_string(),
            name: format!("{code} 품목"),
            category_id: None,
            unit_price: 1_000,
            cost_price: 600,
            unit: Some("EA".to_string()),
            min_stock: 0,
        })
        .await
        .expect("create item")
}

/// An item with `quantity` on hand, booked as an adjustment.
pub async fn stocked_item(db: &Database, code: &str, quantity: i64) -> Item {
    let item = item(db, code).await;
    db.inventory()
        .adjust(&item.id, quantity, Some("기초 재고"), Some("tester"))
        .await
        .expect("opening stock");
    item
}

pub async fn partner(db: &Database, code: &str) -> Partner {
    db.partners()
        .create(&NewPartner {
            code: code.to_string(),
            name: format!("{code} 상사"),
            partner_type: PartnerType::Customer,
            business_number: None,
            phone: None,
        })
        .await
        .expect("create partner")
}

pub async fn account(db: &Database, code: &str, account_type: AccountType) -> Account {
    db.accounts()
        .create(&NewAccount {
            code: code.to_string(),
            name: format!("계정 {code}"),
            account_type,
        })
        .await
        .expect("create account")
}

pub fn sale() -> TransactionDraft {
    draft(TransactionType::Sale)
}

pub fn purchase() -> TransactionDraft {
    draft(TransactionType::Purchase)
}

fn draft(transaction_type: TransactionType) -> TransactionDraft {
    TransactionDraft {
        transaction_type,
        partner_id: None,
        transaction_date: today(),
        status: None,
        total_amount: None,
        tax_amount: None,
        notes: None,
    }
}

pub fn line(item: &Item, quantity: i64) -> TransactionLineDraft {
    TransactionLineDraft {
        item_id: item.id.clone(),
        quantity,
        unit_price: item.unit_price,
        tax_rate_bps: None,
        tax_amount: None,
        description: None,
    }
}

pub fn voucher(voucher_type: VoucherType, amount: i64) -> VoucherDraft {
    VoucherDraft {
        voucher_date: today(),
        voucher_type,
        amount,
        description: None,
    }
}

pub fn entry(account: &Account, amount: i64) -> VoucherLineDraft {
    VoucherLineDraft {
        account_id: account.id.clone(),
        amount,
        description: None,
    }
}

pub async fn count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .expect("count rows")
}
