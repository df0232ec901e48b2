//! Customer management route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use puffshop_core::UserId;

use crate::db::customers::CustomerRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::{Customer, CustomerUpdateInput};
use crate::state::AppState;

/// All customers with order history, newest first.
#[instrument(skip(state))]
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>> {
    let customers = CustomerRepository::new(state.pool()).list().await?;
    Ok(Json(customers))
}

/// Customer detail, order items included.
#[instrument(skip(state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Customer>> {
    let customer = CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
    Ok(Json(customer))
}

/// Enable or disable a customer account.
#[instrument(skip(admin, state), fields(admin = %admin.email))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(input): Json<CustomerUpdateInput>,
) -> Result<Json<Customer>> {
    let customer = CustomerRepository::new(state.pool())
        .set_active(id, input.is_active)
        .await?;
    tracing::info!(customer = %customer.email, is_active = customer.is_active, "customer updated");
    Ok(Json(customer))
}
