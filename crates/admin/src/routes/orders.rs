//! Order management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;

use puffshop_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::{AdminOrder, OrderStatusInput};
use crate::state::AppState;

/// All orders, newest first.
#[instrument(skip(state))]
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminOrder>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// Order detail.
#[instrument(skip(state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<AdminOrder>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(order))
}

/// Move an order to a new status.
#[instrument(skip(admin, state), fields(admin = %admin.email))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(input): Json<OrderStatusInput>,
) -> Result<Json<AdminOrder>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, input.status)
        .await?;
    tracing::info!(order = %order.order_number, status = %order.status, "order status updated");
    Ok(Json(order))
}

/// Plain-text invoice download.
#[instrument(skip(state))]
pub async fn invoice(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let filename = format!("invoice-{}.txt", order.order_number);
    let body = render_invoice(&order);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Render the invoice text.
fn render_invoice(order: &AdminOrder) -> String {
    let mut lines = vec![
        "INVOICE".to_string(),
        "=======".to_string(),
        String::new(),
        format!("Order: {}", order.order_number),
        format!("Date: {}", order.created_at.format("%Y-%m-%d")),
        format!("Customer: {}", order.customer_name),
        format!("Email: {}", order.customer_email),
        format!("Phone: {}", order.customer_phone),
        String::new(),
        "Shipping Address:".to_string(),
        order.shipping_address.clone(),
        String::new(),
        "Items:".to_string(),
    ];

    for item in &order.items {
        let line_total = item.unit_price * Decimal::from(item.quantity);
        let variant = item
            .variant_label
            .as_ref()
            .map(|label| format!(" [{label}]"))
            .unwrap_or_default();
        lines.push(format!(
            "- {}{} x{} @ ${:.2} = ${:.2}",
            item.product_name, variant, item.quantity, item.unit_price, line_total
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total: ${:.2}", order.total));
    lines.push(format!("Status: {}", order.status));
    lines.push(String::new());
    lines.push("Thank you for your business!".to_string());

    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use puffshop_core::{OrderStatus, ProductId};

    use crate::models::AdminOrderItem;

    use super::*;

    #[test]
    fn test_invoice_lists_items_and_totals() {
        let order = AdminOrder {
            id: OrderId::new(),
            order_number: "PS-7XKQM2WN".to_owned(),
            customer_name: "Ada Buyer".to_owned(),
            customer_email: "ada@example.com".to_owned(),
            customer_phone: "555-0100".to_owned(),
            shipping_address: "1 Main St".to_owned(),
            notes: None,
            total: Decimal::new(8497, 2),
            status: OrderStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 7, 4, 9, 30, 0).unwrap(),
            items: vec![
                AdminOrderItem {
                    product_id: ProductId::new(),
                    product_name: "Premium Puff Pro".to_owned(),
                    quantity: 2,
                    unit_price: Decimal::new(2999, 2),
                    variant_label: Some("Flavor: Mint".to_owned()),
                },
                AdminOrderItem {
                    product_id: ProductId::new(),
                    product_name: "Mint Fresh Puff".to_owned(),
                    quantity: 1,
                    unit_price: Decimal::new(2499, 2),
                    variant_label: None,
                },
            ],
        };

        let text = render_invoice(&order);
        assert!(text.starts_with("INVOICE"));
        assert!(text.contains("Order: PS-7XKQM2WN"));
        assert!(text.contains("Date: 2025-07-04"));
        assert!(text.contains("- Premium Puff Pro [Flavor: Mint] x2 @ $29.99 = $59.98"));
        assert!(text.contains("- Mint Fresh Puff x1 @ $24.99 = $24.99"));
        assert!(text.contains("Total: $84.97"));
        assert!(text.contains("Status: PENDING"));
    }
}
