//! # jangbu-server: HTTP API for the Jangbu Ledger
//!
//! A thin axum layer over `jangbu-db`. Handlers parse the request into the
//! typed drafts of `jangbu-core`, call one repository method (which owns
//! the atomic scope), append the audit-log entry after it commits, and map
//! errors through [`error::ApiError`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /api/transactions  { transaction, items }   x-user-id: kim        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TraceLayer / CorsLayer                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ActingUser + ApiJson<CreateTransactionRequest>   (401 / 400 on reject) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.transactions().create(..)  ── one AtomicScope, commit or rollback   │
//! │       │                                                                 │
//! │       ├── Err ─► ApiError ─► 400 / 404 / 409 / 500                      │
//! │       ▼                                                                 │
//! │  db.activities().record(..)    ── after commit, failure only logged     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  201 Created + JSON                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod telemetry;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use jangbu_db::Database;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
