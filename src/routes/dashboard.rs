//! Dashboard routes: the signed-in user's sidebar.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::session::ResolvedSession;
use crate::services::dashboard::{self, DashboardLayout};
use crate::AppState;

/// GET /dashboard — sidebar layout for the current session.
///
/// Without a session the page does not exist for the caller: 404, and the
/// store is never read.
pub async fn layout(
    State(state): State<AppState>,
    ResolvedSession(session): ResolvedSession,
) -> Result<Json<ApiResponse<DashboardLayout>>, AppError> {
    let session = session.ok_or_else(|| AppError::NotFound("Page not found".to_string()))?;

    let data = dashboard::aggregate(state.store.as_ref(), &session).await?;
    Ok(ApiResponse::success(dashboard::build_layout(&session, data)))
}
