//! Product management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use puffshop_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::{AdminProduct, ProductInput, StockUpdateInput};
use crate::state::AppState;

/// All products, newest first.
#[instrument(skip(state))]
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminProduct>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<AdminProduct>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

/// Create a product with gallery and variants.
#[instrument(skip(admin, state, input), fields(admin = %admin.email))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<AdminProduct>)> {
    validate(&input)?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product; the payload's gallery and variants replace the
/// existing sets.
#[instrument(skip(admin, state, input), fields(admin = %admin.email))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<AdminProduct>> {
    validate(&input)?;
    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(Json(product))
}

/// Delete a product (refused while order history references it).
#[instrument(skip(admin, state), fields(admin = %admin.email))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Manual stock adjustment; logged.
#[instrument(skip(admin, state), fields(admin = %admin.email))]
pub async fn update_stock(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<StockUpdateInput>,
) -> Result<Json<AdminProduct>> {
    if input.stock < 0 {
        return Err(AppError::BadRequest(
            "Stock cannot be negative".to_string(),
        ));
    }
    let product = ProductRepository::new(state.pool())
        .update_stock(id, input.stock)
        .await?;
    Ok(Json(product))
}

fn validate(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if input.price.is_sign_negative() {
        return Err(AppError::BadRequest(
            "Price cannot be negative".to_string(),
        ));
    }
    if input.stock < 0 {
        return Err(AppError::BadRequest(
            "Stock cannot be negative".to_string(),
        ));
    }
    Ok(())
}
