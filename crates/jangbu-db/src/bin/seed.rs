//! # Demo Data Seeder
//!
//! Fills a database with a small chart of accounts, a few partners and
//! items, and opening stock for each item.
//!
//! ## Usage
//! ```bash
//! # Seed ./jangbu_dev.db
//! cargo run -p jangbu-db --bin seed
//!
//! # Specify database path
//! cargo run -p jangbu-db --bin seed -- --db ./data/jangbu.db
//! ```
//!
//! Opening stock goes through the inventory ledger as `adjustment`
//! entries, so the history of every item starts at its seeded quantity.

use std::env;

use jangbu_core::{AccountType, NewAccount, NewItem, NewPartner, PartnerType};
use jangbu_db::{Database, DbConfig};

const SEED_ACTOR: &str = "seed";

/// (code, name, type)
const ACCOUNTS: &[(&str, &str, AccountType)] = &[
    ("101", "현금", AccountType::Asset),
    ("102", "보통예금", AccountType::Asset),
    ("108", "외상매출금", AccountType::Asset),
    ("146", "상품", AccountType::Asset),
    ("251", "외상매입금", AccountType::Liability),
    ("331", "자본금", AccountType::Equity),
    ("401", "상품매출", AccountType::Revenue),
    ("451", "상품매출원가", AccountType::Expense),
    ("811", "복리후생비", AccountType::Expense),
    ("819", "임차료", AccountType::Expense),
];

/// (code, name, type)
const PARTNERS: &[(&str, &str, PartnerType)] = &[
    ("C001", "한빛상사", PartnerType::Customer),
    ("C002", "푸른유통", PartnerType::Customer),
    ("S001", "대한물산", PartnerType::Supplier),
    ("S002", "새봄산업", PartnerType::Both),
];

/// (code, name, unit price, cost price, min stock, opening stock)
const ITEMS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("A4-BOX", "A4 용지 (박스)", 25_000, 18_000, 10, 40),
    ("PEN-BLK", "볼펜 검정", 500, 250, 100, 300),
    ("PEN-RED", "볼펜 빨강", 500, 250, 50, 120),
    ("NOTE-A5", "노트 A5", 2_000, 1_100, 30, 25),
    ("TONER-K", "토너 검정", 89_000, 61_000, 5, 8),
    ("CLIP-S", "클립 소", 1_500, 700, 20, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./jangbu_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Jangbu Demo Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./jangbu_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Jangbu Demo Data Seeder");
    println!("=======================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.items().count().await? + db.accounts().count().await?;
    if existing > 0 {
        println!("⚠ Database already has catalog data");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (code, name, account_type) in ACCOUNTS {
        db.accounts()
            .create(&NewAccount {
                code: code.to_string(),
                name: name.to_string(),
                account_type: *account_type,
            })
            .await?;
    }
    println!("✓ {} accounts", ACCOUNTS.len());

    for (code, name, partner_type) in PARTNERS {
        db.partners()
            .create(&NewPartner {
                code: code.to_string(),
                name: name.to_string(),
                partner_type: *partner_type,
                business_number: None,
                phone: None,
            })
            .await?;
    }
    println!("✓ {} partners", PARTNERS.len());

    for (code, name, unit_price, cost_price, min_stock, opening) in ITEMS {
        let item = db
            .items()
            .create(&NewItem {
                code: code.to_string(),
                name: name.to_string(),
                category_id: None,
                unit_price: *unit_price,
                cost_price: *cost_price,
                unit: Some("EA".to_string()),
                min_stock: *min_stock,
            })
            .await?;

        if *opening != 0 {
            db.inventory()
                .adjust(&item.id, *opening, Some("기초 재고"), Some(SEED_ACTOR))
                .await?;
        }
    }
    println!("✓ {} items with opening stock", ITEMS.len());

    let low = db.inventory().low_stock().await?;
    println!();
    println!("Below minimum stock: {}", low.len());
    for level in &low {
        println!("  {} {} ({} < {})", level.code, level.name, level.quantity, level.min_stock);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
