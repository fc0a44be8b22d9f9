//! API route definitions.
//!
//! ```text
//! /api
//!  ├── /health
//!  ├── /transactions[/{id}[/items]]
//!  ├── /accounting/vouchers[/{id}[/status]]
//!  ├── /accounting/accounts[/{id}]
//!  ├── /inventory[/history | /alerts/low | /{item_id}[/adjust | /history]]
//!  ├── /items[/{id}]   /partners[/{id}]
//!  └── /activities
//! ```

use axum::Router;
use serde_json::Value;
use tracing::warn;

use crate::extract::ActingUser;
use crate::AppState;
use jangbu_db::ActivityRecord;

pub mod activity;
pub mod catalog;
pub mod health;
pub mod inventory;
pub mod transactions;
pub mod vouchers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(transactions::routes())
        .merge(vouchers::routes())
        .merge(inventory::routes())
        .merge(catalog::routes())
        .merge(activity::routes())
}

/// Appends an audit-log entry for a committed write.
///
/// Runs after the posting's scope has committed. A failure here is logged
/// and swallowed: the posting stands.
pub(crate) async fn record_activity(
    state: &AppState,
    user: &ActingUser,
    action: &str,
    resource: &str,
    resource_id: Option<&str>,
    details: Option<Value>,
) {
    let record = ActivityRecord {
        user_id: user.id(),
        action,
        resource,
        resource_id,
        details,
    };

    if let Err(err) = state.db.activities().record(record).await {
        warn!(
            error = %err,
            user_id = %user.id(),
            action,
            resource,
            "Failed to record user activity"
        );
    }
}
