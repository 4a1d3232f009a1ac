//! JSON API for the dashboard.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use crate::{
    error::AppError,
    middleware::RequireAdminAuth,
    state::AppState,
    views::DashboardSnapshot,
};

use super::dashboard::DashboardQuery;

/// Current dashboard state as JSON.
///
/// GET /api/dashboard?status=
#[instrument(skip_all, fields(admin = %auth.admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let filter = query.filter()?;
    let view = state
        .dashboard(&auth.access_token)
        .load(&auth.admin, filter, query.tab())
        .await?;
    Ok(Json(view.snapshot()))
}
