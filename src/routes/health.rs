//! Health check endpoints for liveness and readiness checks.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::store;
use crate::AppState;

/// Readiness check detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub store: String,
}

/// Liveness check — always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness check — pings the key-value store.
///
/// Answers 503 with `status: "degraded"` while the store is unreachable.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    let (code, status, store_status) = match store::ping(state.store.as_ref()).await {
        Ok(()) => (StatusCode::OK, "ok", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "degraded",
                format!("error: {e}"),
            )
        }
    };

    (
        code,
        ApiResponse::success(HealthStatus {
            status: status.to_string(),
            store: store_status,
        }),
    )
}
