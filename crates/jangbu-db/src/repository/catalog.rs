//! # Catalog Repositories
//!
//! Items and partners. Plain CRUD: the posting engine only reads them, to
//! resolve the references on transaction lines and headers.
//!
//! The `*_on` functions take a connection so posters can resolve
//! references inside their own atomic scope.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use jangbu_core::validation::{validate_new_item, validate_new_partner};
use jangbu_core::{Item, NewItem, NewPartner, Partner};

// =============================================================================
// Items
// =============================================================================

/// Repository for catalog items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Creates an item. Duplicate codes fail with `UniqueViolation`.
    pub async fn create(&self, input: &NewItem) -> DbResult<Item> {
        validate_new_item(input)?;

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            category_id: input.category_id.clone(),
            unit_price: input.unit_price,
            cost_price: input.cost_price,
            unit: input.unit.clone(),
            min_stock: input.min_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, code = %item.code, "Creating item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, code, name, category_id, unit_price, cost_price,
                unit, min_stock, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(&item.category_id)
        .bind(item.unit_price)
        .bind(item.cost_price)
        .bind(&item.unit)
        .bind(item.min_stock)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &item.code),
            other => other,
        })?;

        Ok(item)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let mut conn = self.pool.acquire().await?;
        fetch_item_on(&mut conn, id).await
    }

    /// Lists items ordered by code.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, code, name, category_id, unit_price, cost_price,
                   unit, min_stock, is_active, created_at, updated_at
            FROM items
            WHERE is_active = 1 OR ?1
            ORDER BY code
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Loads an item on the given connection.
pub(crate) async fn fetch_item_on(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(
        r#"
        SELECT id, code, name, category_id, unit_price, cost_price,
               unit, min_stock, is_active, created_at, updated_at
        FROM items
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}

// =============================================================================
// Partners
// =============================================================================

/// Repository for customers and suppliers.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    pool: SqlitePool,
}

impl PartnerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PartnerRepository { pool }
    }

    pub async fn create(&self, input: &NewPartner) -> DbResult<Partner> {
        validate_new_partner(input)?;

        let partner = Partner {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            partner_type: input.partner_type,
            business_number: input.business_number.clone(),
            phone: input.phone.clone(),
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %partner.id, code = %partner.code, "Creating partner");

        sqlx::query(
            r#"
            INSERT INTO partners (
                id, code, name, partner_type, business_number, phone, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&partner.id)
        .bind(&partner.code)
        .bind(&partner.name)
        .bind(partner.partner_type)
        .bind(&partner.business_number)
        .bind(&partner.phone)
        .bind(partner.is_active)
        .bind(partner.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &partner.code),
            other => other,
        })?;

        Ok(partner)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Partner>> {
        let mut conn = self.pool.acquire().await?;
        fetch_partner_on(&mut conn, id).await
    }

    pub async fn list(&self) -> DbResult<Vec<Partner>> {
        let partners = sqlx::query_as::<_, Partner>(
            r#"
            SELECT id, code, name, partner_type, business_number, phone, is_active, created_at
            FROM partners
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(partners)
    }
}

/// Loads a partner on the given connection.
pub(crate) async fn fetch_partner_on(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Partner>> {
    let partner = sqlx::query_as::<_, Partner>(
        r#"
        SELECT id, code, name, partner_type, business_number, phone, is_active, created_at
        FROM partners
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(partner)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::error::DbError;
    use jangbu_core::{NewItem, NewPartner, PartnerType};

    fn new_item(code: &str) -> NewItem {
        NewItem {
            code: code.to_string(),
            name: format!("{code} 품목"),
            category_id: None,
            unit_price: 1000,
            cost_price: 700,
            unit: Some("EA".to_string()),
            min_stock: 5,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db.items().create(&new_item("A4-BOX")).await.unwrap();

        let loaded = db.items().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.code, "A4-BOX");
        assert_eq!(loaded.min_stock, 5);
        assert!(loaded.is_active);
        assert_eq!(db.items().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_item_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.items().create(&new_item("A4-BOX")).await.unwrap();

        let err = db.items().create(&new_item("A4-BOX")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "code"));
    }

    #[tokio::test]
    async fn test_invalid_item_rejected_before_insert() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.items().create(&new_item("bad code")).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
        assert_eq!(db.items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_partner_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let partner = db
            .partners()
            .create(&NewPartner {
                code: "C001".to_string(),
                name: "한빛상사".to_string(),
                partner_type: PartnerType::Customer,
                business_number: None,
                phone: None,
            })
            .await
            .unwrap();

        let listed = db.partners().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, partner.id);
        assert_eq!(listed[0].partner_type, PartnerType::Customer);
    }
}
