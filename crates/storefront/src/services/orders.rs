//! Order service gateway: the cart manager's checkout boundary.
//!
//! Checkout serializes the cart snapshot plus customer details and posts it
//! to the order-creation endpoint. That collaborator revalidates prices and
//! stock, persists the order, and returns an order identifier for the
//! confirmation view. The gateway validates nothing beyond success/failure;
//! on failure the caller leaves the cart untouched so the user can retry.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use puffshop_core::OrderId;

use crate::models::OrderDraft;

/// Errors from submitting an order.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request itself failed (connect, timeout, body).
    #[error("order service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The order service rejected the submission.
    #[error("order service rejected the order: {status} - {message}")]
    Rejected { status: u16, message: String },
}

/// What the gateway reads back from a successful submission.
///
/// The order service returns the full order; only the identifiers matter
/// here, the rest is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub id: OrderId,
    pub order_number: String,
}

/// Client for the order-creation endpoint.
#[derive(Debug, Clone)]
pub struct OrderGateway {
    client: reqwest::Client,
    endpoint: Url,
}

impl OrderGateway {
    /// Create a gateway pointed at an order-creation endpoint.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client fails to build.
    pub fn new(endpoint: Url) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Submit an order draft, returning the created order's identifiers.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` when the service is unreachable and
    /// `GatewayError::Rejected` when it answers with a non-success status.
    pub async fn submit(&self, draft: &OrderDraft) -> Result<OrderReceipt, GatewayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(draft)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<OrderReceipt>().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_parses_from_order_json() {
        // The order service returns the whole order; unknown fields are
        // ignored by design.
        let id = OrderId::new();
        let json = format!(
            r#"{{"id":"{id}","orderNumber":"PS-7XKQM2WN","total":"42.00","status":"PENDING"}}"#
        );
        let receipt: OrderReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(receipt.id, id);
        assert_eq!(receipt.order_number, "PS-7XKQM2WN");
    }
}
