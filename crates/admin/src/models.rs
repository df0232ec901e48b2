//! Domain models and wire payloads for the admin API.
//!
//! Admin shapes expose everything the back-office needs (inactive rows,
//! thresholds, counters); the storefront has its own narrower models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use puffshop_core::{
    DiscountId, DiscountKind, Email, ImageId, OrderId, OrderStatus, ProductId, StockLogId,
    UserId, VariantId,
};

/// Session-stored admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

// =============================================================================
// Catalog
// =============================================================================

/// A product as managed by the back-office.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub featured: bool,
    pub is_active: bool,
    pub views: i32,
    pub sales: i32,
    pub gallery: Vec<AdminProductImage>,
    pub variants: Vec<AdminProductVariant>,
    /// Most recent stock movements, newest first.
    pub stock_logs: Vec<StockLog>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminProduct {
    /// Whether this product should appear in inventory alerts.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// One gallery image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductImage {
    pub id: ImageId,
    pub url: String,
    pub alt: String,
    pub is_primary: bool,
    pub position: i32,
}

/// One product variant, including inactive ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductVariant {
    pub id: VariantId,
    pub name: String,
    pub value: String,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub sku: Option<String>,
    pub is_active: bool,
    pub position: i32,
}

/// A stock movement audit row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLog {
    pub id: StockLogId,
    pub product_id: ProductId,
    pub old_stock: i32,
    pub new_stock: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Create/update payload for a product. Gallery and variants replace the
/// existing sets wholesale, mirroring how the admin UI edits them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub gallery: Vec<ImageInput>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

/// One gallery image in a product payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub position: Option<i32>,
}

/// One variant in a product payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub position: Option<i32>,
}

/// Stock adjustment payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateInput {
    pub stock: i32,
}

// =============================================================================
// Orders
// =============================================================================

/// An order as listed in the back-office.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<AdminOrderItem>,
}

/// One order line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// e.g. "Flavor: Mint"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,
}

/// Order status change payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusInput {
    pub status: OrderStatus,
}

// =============================================================================
// Customers
// =============================================================================

/// A storefront customer with order history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub orders: Vec<CustomerOrder>,
}

/// One order in a customer's history. `items` is populated on the detail
/// view only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    pub id: OrderId,
    pub order_number: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<AdminOrderItem>,
}

/// Customer activity toggle payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateInput {
    pub is_active: bool,
}

// =============================================================================
// Discounts
// =============================================================================

/// A discount code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Discount {
    /// Whether the code can be applied at `now`: active, inside its window,
    /// and under its usage cap.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if now < self.starts_at || now > self.ends_at {
            return false;
        }
        match self.max_uses {
            Some(max) => self.used_count < max,
            None => true,
        }
    }
}

/// Create/update payload for a discount.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_amount: Option<Decimal>,
    #[serde(default)]
    pub max_uses: Option<i32>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// =============================================================================
// Analytics
// =============================================================================

/// The dashboard analytics payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub total_customers: i64,
    pub today_orders: i64,
    pub low_stock_products: i64,
    /// Revenue per day for the trailing 7 days, oldest first.
    pub sales_data: Vec<DailySales>,
    pub top_products: Vec<TopProduct>,
    pub order_status_data: Vec<StatusCount>,
}

/// Revenue for one day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: chrono::NaiveDate,
    pub sales: Decimal,
}

/// A best-seller row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub sales: i32,
}

/// Orders grouped by status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

const fn default_true() -> bool {
    true
}

const fn default_low_stock_threshold() -> i32 {
    10
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn discount(is_active: bool, max_uses: Option<i32>, used: i32) -> Discount {
        Discount {
            id: DiscountId::new(),
            code: "SUMMER10".to_owned(),
            name: "Summer Sale".to_owned(),
            description: None,
            kind: DiscountKind::Percentage,
            value: Decimal::from(10),
            min_amount: None,
            max_uses,
            used_count: used,
            starts_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2025, 8, 31, 23, 59, 59).unwrap(),
            is_active,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_discount_valid_inside_window() {
        let d = discount(true, None, 0);
        let now = Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap();
        assert!(d.is_valid_at(now));
    }

    #[test]
    fn test_discount_invalid_outside_window() {
        let d = discount(true, None, 0);
        let before = Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        assert!(!d.is_valid_at(before));
        assert!(!d.is_valid_at(after));
    }

    #[test]
    fn test_discount_invalid_when_inactive_or_exhausted() {
        let now = Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap();
        assert!(!discount(false, None, 0).is_valid_at(now));
        assert!(!discount(true, Some(100), 100).is_valid_at(now));
        assert!(discount(true, Some(100), 99).is_valid_at(now));
    }

    #[test]
    fn test_low_stock_compares_against_threshold() {
        let product = AdminProduct {
            id: ProductId::new(),
            name: "Premium Puff Pro".to_owned(),
            description: String::new(),
            price: Decimal::from(29),
            category: "Disposable".to_owned(),
            stock: 10,
            low_stock_threshold: 10,
            featured: false,
            is_active: true,
            views: 0,
            sales: 0,
            gallery: vec![],
            variants: vec![],
            stock_logs: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
    }
}
