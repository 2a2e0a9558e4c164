//! Health check endpoint
//!
//! # Endpoint
//!
//! ```text
//! GET /health
//! ```
//!
//! # Response
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "database": "connected",
//!   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 },
//!   "migrations": { "applied_migrations": 5, "latest_version": 20250101000005, "is_up_to_date": true }
//! }
//! ```
//!
//! `status` is `degraded` when the database is unreachable or migrations are
//! pending; the endpoint itself still answers `200`.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use kanban_shared::db::{
    migrations::{get_migration_status, MigrationStatus},
    pool::{health_check as ping_database, pool_stats, PoolStats},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub pool: PoolStats,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match ping_database(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let migrations = if connected {
        get_migration_status(&state.db).await.ok()
    } else {
        None
    };

    let up_to_date = migrations.as_ref().is_some_and(|m| m.is_up_to_date);

    Ok(Json(HealthResponse {
        status: if connected && up_to_date { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        pool: pool_stats(&state.db),
        migrations,
    }))
}
