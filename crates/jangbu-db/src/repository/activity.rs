//! # Activity Repository
//!
//! The audit log (`user_activities`): who did what, written after a
//! posting commits. It is not part of the posting's atomic scope, so a
//! failed audit write never undoes a committed posting.

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use jangbu_core::UserActivity;

/// One audit entry to record.
#[derive(Debug, Clone)]
pub struct ActivityRecord<'a> {
    pub user_id: &'a str,
    pub action: &'a str,
    pub resource: &'a str,
    pub resource_id: Option<&'a str>,
    pub details: Option<Value>,
}

/// Repository for the audit log.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Appends an audit entry.
    pub async fn record(&self, record: ActivityRecord<'_>) -> DbResult<UserActivity> {
        let activity = UserActivity {
            id: Uuid::new_v4().to_string(),
            user_id: record.user_id.to_string(),
            action: record.action.to_string(),
            resource: record.resource.to_string(),
            resource_id: record.resource_id.map(str::to_string),
            details: record.details.map(|d| d.to_string()),
            created_at: Utc::now(),
        };

        debug!(
            user_id = %activity.user_id,
            action = %activity.action,
            resource = %activity.resource,
            "Recording user activity"
        );

        sqlx::query(
            r#"
            INSERT INTO user_activities (
                id, user_id, action, resource, resource_id, details, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&activity.id)
        .bind(&activity.user_id)
        .bind(&activity.action)
        .bind(&activity.resource)
        .bind(&activity.resource_id)
        .bind(&activity.details)
        .bind(activity.created_at)
        .execute(&self.pool)
        .await?;

        Ok(activity)
    }

    /// Most recent entries first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<UserActivity>> {
        let activities = sqlx::query_as::<_, UserActivity>(
            r#"
            SELECT id, user_id, action, resource, resource_id, details, created_at
            FROM user_activities
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use serde_json::json;

    #[tokio::test]
    async fn test_record_and_read_back_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let log = db.activities();

        log.record(ActivityRecord {
            user_id: "kim",
            action: "create",
            resource: "vouchers",
            resource_id: Some("v-1"),
            details: Some(json!({ "code": "I20261016-001" })),
        })
        .await
        .unwrap();
        log.record(ActivityRecord {
            user_id: "kim",
            action: "delete",
            resource: "vouchers",
            resource_id: Some("v-1"),
            details: None,
        })
        .await
        .unwrap();

        let recent = log.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "delete");
        assert_eq!(
            recent[1].details.as_deref(),
            Some(r#"{"code":"I20261016-001"}"#)
        );
    }
}
