//! Order service route handlers.
//!
//! This is the collaborator the checkout gateway submits to. It owns the
//! revalidation the cart defers: existence, activity, and stock at
//! submission time, with every amount recomputed from the live catalog.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use puffshop_core::{Email, OrderId};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::{Order, OrderDraft};
use crate::state::AppState;

/// Create an order from a submitted cart snapshot.
#[instrument(skip(state, draft))]
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>)> {
    if draft.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".to_string()));
    }
    if draft.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::BadRequest(
            "Line quantity must be at least 1".to_string(),
        ));
    }
    Email::parse(&draft.customer_email).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let order = OrderRepository::new(state.pool()).create(&draft).await?;

    tracing::info!(
        order_number = %order.order_number,
        total = %order.total,
        "order created"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// Order detail for the confirmation view.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<OrderId>) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}
