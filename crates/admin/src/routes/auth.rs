//! Admin authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password login; stores the admin identity in the session.
#[instrument(skip(state, session, req))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<CurrentAdmin>> {
    let admin = AuthService::new(state.pool())
        .login(&req.email, &req.password)
        .await?;

    session
        .insert(session_keys::CURRENT_ADMIN, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    tracing::info!(admin = %admin.email, "admin logged in");
    Ok(Json(admin))
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush failed: {e}")))?;
    Ok(StatusCode::NO_CONTENT)
}
