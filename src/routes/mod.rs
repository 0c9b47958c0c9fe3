//! Route definitions for the chat dashboard API.

pub mod auth;
pub mod dashboard;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::AppState;

/// Application router without transport layers (CORS, tracing).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/dashboard", get(dashboard::layout))
        .route("/api/auth/{*action}", get(auth::handler).post(auth::handler))
        .with_state(state)
}
