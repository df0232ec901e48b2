//! Dashboard analytics route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::analytics::AnalyticsRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::Analytics;
use crate::state::AppState;

/// Dashboard aggregates: totals, today's orders, low-stock count, top
/// sellers, status breakdown, and the trailing 7-day revenue series.
#[instrument(skip(state))]
pub async fn summary(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Analytics>> {
    let analytics = AnalyticsRepository::new(state.pool()).summary().await?;
    Ok(Json(analytics))
}
