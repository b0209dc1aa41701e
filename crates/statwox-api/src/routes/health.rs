use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use serde::Serialize;

use statwox_storage::db;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: Timestamp,
    pub version: &'static str,
}

/// Liveness plus a database round-trip. 503 when the database is down.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let (code, status, database) = match db::ping(&state.pool).await {
        Ok(()) => (StatusCode::OK, "ok", "connected"),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "error", "disconnected")
        }
    };

    (
        code,
        Json(HealthStatus {
            status,
            database,
            timestamp: Timestamp::now(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
