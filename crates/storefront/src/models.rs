//! Domain models for the storefront API.
//!
//! Wire format is camelCase JSON throughout, matching what the original
//! client stored and submitted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use puffshop_core::cart::{ProductSnapshot, SelectedVariant, VariantSnapshot};
use puffshop_core::{ImageId, OrderId, OrderStatus, ProductId, VariantId};

/// A catalog product as served to storefront clients.
///
/// Only active products are ever loaded here, and only their active variants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: u32,
    pub featured: bool,
    pub gallery: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
}

/// One image in a product gallery, in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ImageId,
    pub url: String,
    pub alt: String,
    pub is_primary: bool,
    pub position: i32,
}

/// A purchasable option of a product.
///
/// `price` is an absolute override of the product price when present; the
/// cart works in deltas, so [`ProductVariant::to_cart_snapshot`] converts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    pub name: String,
    pub value: String,
    pub price: Option<Decimal>,
    pub stock: u32,
    pub sku: Option<String>,
    pub position: i32,
}

impl Product {
    /// The primary gallery image, falling back to the first one.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.gallery
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.gallery.first())
    }

    /// Find a variant by id, falling back to lookup by option value.
    #[must_use]
    pub fn find_variant(
        &self,
        id: Option<VariantId>,
        value: Option<&str>,
    ) -> Option<&ProductVariant> {
        if let Some(id) = id {
            return self.variants.iter().find(|v| v.id == id);
        }
        value.and_then(|value| self.variants.iter().find(|v| v.value == value))
    }

    /// The add-to-cart snapshot of this product.
    #[must_use]
    pub fn to_cart_snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            image_url: self.primary_image().map(|img| img.url.clone()),
            price: self.price,
            stock: self.stock,
        }
    }
}

impl ProductVariant {
    /// The add-to-cart snapshot of this variant.
    ///
    /// The absolute price override becomes a delta against the product's own
    /// price, which is how cart lines carry variant pricing.
    #[must_use]
    pub fn to_cart_snapshot(&self, base_price: Decimal) -> VariantSnapshot {
        VariantSnapshot {
            id: Some(self.id),
            name: self.name.clone(),
            value: self.value.clone(),
            price_delta: self.price.map(|price| price - base_price),
            stock: self.stock,
        }
    }
}

/// An order as returned by the order service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
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
    pub items: Vec<OrderItem>,
}

/// One line of an order, with the variant descriptor inlined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<SelectedVariant>,
}

/// The checkout submission: customer details plus the cart snapshot.
///
/// This is both what the checkout gateway sends and what the order service
/// accepts. Prices inside are client claims; the order service recomputes
/// every amount from the catalog before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<OrderDraftItem>,
    /// Client-side total, kept for auditing; never trusted.
    pub total: Decimal,
}

/// One submitted cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraftItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Client-side effective unit price; recomputed server-side.
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<SelectedVariant>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant(value: &str, price: Option<i64>) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(),
            name: "Size".to_owned(),
            value: value.to_owned(),
            price: price.map(Decimal::from),
            stock: 5,
            sku: None,
            position: 0,
        }
    }

    fn product_with(gallery: Vec<ProductImage>, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: ProductId::new(),
            name: "Mint Fresh Puff".to_owned(),
            description: String::new(),
            price: Decimal::from(25),
            category: "Disposable".to_owned(),
            stock: 75,
            featured: true,
            gallery,
            variants,
            created_at: Utc::now(),
        }
    }

    fn image(url: &str, is_primary: bool) -> ProductImage {
        ProductImage {
            id: ImageId::new(),
            url: url.to_owned(),
            alt: String::new(),
            is_primary,
            position: 0,
        }
    }

    #[test]
    fn test_primary_image_prefers_flagged() {
        let product = product_with(
            vec![image("/a.svg", false), image("/b.svg", true)],
            vec![],
        );
        assert_eq!(product.primary_image().unwrap().url, "/b.svg");
    }

    #[test]
    fn test_primary_image_falls_back_to_first() {
        let product = product_with(
            vec![image("/a.svg", false), image("/b.svg", false)],
            vec![],
        );
        assert_eq!(product.primary_image().unwrap().url, "/a.svg");
    }

    #[test]
    fn test_find_variant_prefers_id_over_value() {
        let v1 = variant("Regular", None);
        let v2 = variant("Large", Some(30));
        let id = v2.id;
        let product = product_with(vec![], vec![v1, v2]);

        let found = product.find_variant(Some(id), Some("Regular")).unwrap();
        assert_eq!(found.value, "Large");
    }

    #[test]
    fn test_variant_override_becomes_delta() {
        let product = product_with(vec![], vec![variant("Large", Some(30))]);
        let snapshot = product.variants[0].to_cart_snapshot(product.price);
        assert_eq!(snapshot.price_delta, Some(Decimal::from(5)));
    }

    #[test]
    fn test_variant_without_override_has_no_delta() {
        let product = product_with(vec![], vec![variant("Regular", None)]);
        let snapshot = product.variants[0].to_cart_snapshot(product.price);
        assert_eq!(snapshot.price_delta, None);
    }
}
