//! Cart line items, identity resolution, and cart operations.
//!
//! The cart is a plain sequence of line items owned by one browsing session.
//! Everything in this module is pure and synchronous: persistence and change
//! notification live in the storefront crate, which loads a snapshot, applies
//! an operation here, and saves the result back.
//!
//! Identity: one line per distinct (product, variant) pair. The variant half
//! of the key prefers the variant id and falls back to the variant value, and
//! that rule is applied in exactly one place ([`LineKey::resolve`]).
//!
//! Stock ceilings are captured when a line is first added and are never
//! reconciled against live inventory; revalidation happens at order
//! submission, not here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, VariantId};

/// Separator between the product and variant halves of a line key.
///
/// `::` is outside the UUID alphabet (hex digits and `-`), so a key for a
/// product without a variant can never collide with a product+variant key.
const KEY_SEPARATOR: &str = "::";

/// A variant chosen at add-to-cart time, as stored on the line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedVariant {
    /// Catalog id of the variant, when the catalog assigned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    /// Option name, e.g. "Color".
    pub variant_name: String,
    /// Option value, e.g. "Red".
    pub variant_value: String,
    /// Amount added to the product's base price for this variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_delta: Option<Decimal>,
}

/// One row in the cart: a product (plus optional variant) and its quantity.
///
/// `name`, `unit_image_url`, `base_price` and `stock_ceiling` are display and
/// clamping caches copied at add-time; they are deliberately not refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Catalog identity of the product.
    pub product_id: ProductId,
    /// Product name at add-time.
    pub name: String,
    /// Primary image URL at add-time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_image_url: Option<String>,
    /// The product's own price at add-time.
    pub base_price: Decimal,
    /// Units of this line, `1..=stock_ceiling`.
    pub quantity: u32,
    /// Maximum purchasable quantity, snapshotted at add-time.
    pub stock_ceiling: u32,
    /// The chosen variant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<SelectedVariant>,
}

impl CartLineItem {
    /// The identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::resolve(self.product_id, self.selected_variant.as_ref())
    }

    /// Effective unit price: base price plus the variant delta, if any.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        let delta = self
            .selected_variant
            .as_ref()
            .and_then(|v| v.price_delta)
            .unwrap_or(Decimal::ZERO);
        self.base_price + delta
    }

    /// Line total: effective unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// Stable identity key for a cart line.
///
/// `product_id` alone when no variant is selected, otherwise
/// `product_id::variant-id-or-value`. The same product+variant always yields
/// the same key regardless of call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineKey(String);

impl LineKey {
    /// Compute the key for a product and an optional selected variant.
    ///
    /// The variant id is canonical when present; the variant value is the
    /// fallback for catalogs that never assigned one.
    #[must_use]
    pub fn resolve(product_id: ProductId, variant: Option<&SelectedVariant>) -> Self {
        match variant {
            Some(v) => {
                let suffix = v
                    .variant_id
                    .map_or_else(|| v.variant_value.clone(), |id| id.to_string());
                Self(format!("{product_id}{KEY_SEPARATOR}{suffix}"))
            }
            None => Self(product_id.to_string()),
        }
    }

    /// The key as a string slice (what the wire format carries).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LineKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog data needed to add a product to the cart.
///
/// A point-in-time snapshot: the cart does not hold a reference back into the
/// catalog.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    /// Catalog identity.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// The product's own price.
    pub price: Decimal,
    /// Product-level stock.
    pub stock: u32,
}

/// Catalog data for a chosen variant at add time.
#[derive(Debug, Clone)]
pub struct VariantSnapshot {
    /// Catalog id of the variant, when assigned.
    pub id: Option<VariantId>,
    /// Option name, e.g. "Flavor".
    pub name: String,
    /// Option value, e.g. "Mint".
    pub value: String,
    /// Amount added to the product's base price.
    pub price_delta: Option<Decimal>,
    /// Variant-level stock; becomes the line's ceiling.
    pub stock: u32,
}

impl From<VariantSnapshot> for SelectedVariant {
    fn from(v: VariantSnapshot) -> Self {
        Self {
            variant_id: v.id,
            variant_name: v.name,
            variant_value: v.value,
            price_delta: v.price_delta,
        }
    }
}

/// An ordered collection of cart lines with the cart operations.
///
/// Operations mutate in place and never fail: out-of-range requests clamp or
/// degrade to no-ops, matching the storefront's "the cart never errors"
/// contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from an existing snapshot, preserving order.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }

    /// The lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart, returning the lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product (with optional variant).
    ///
    /// Merges into an existing line with the same identity key, incrementing
    /// its quantity by 1 silently clamped to that line's stock ceiling.
    /// Otherwise appends a new line with quantity 1. A zero-stock snapshot
    /// adds nothing: a line's quantity can never sit below 1, so there is no
    /// valid line to create.
    ///
    /// Returns the identity key of the affected (or skipped) line.
    pub fn add(&mut self, product: ProductSnapshot, variant: Option<VariantSnapshot>) -> LineKey {
        let ceiling = variant.as_ref().map_or(product.stock, |v| v.stock);
        let selected: Option<SelectedVariant> = variant.map(Into::into);
        let key = LineKey::resolve(product.id, selected.as_ref());

        if let Some(line) = self.items.iter_mut().find(|line| line.key() == key) {
            if line.quantity < line.stock_ceiling {
                line.quantity += 1;
            }
            return key;
        }

        if ceiling == 0 {
            return key;
        }

        self.items.push(CartLineItem {
            product_id: product.id,
            name: product.name,
            unit_image_url: product.image_url,
            base_price: product.price,
            quantity: 1,
            stock_ceiling: ceiling,
            selected_variant: selected,
        });
        key
    }

    /// Set the quantity of the line matching `key`.
    ///
    /// A zero or negative request removes the line; a positive one clamps to
    /// the line's stock ceiling. Unknown keys are a no-op.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i64) {
        if quantity <= 0 {
            self.remove(key);
            return;
        }

        if let Some(line) = self.items.iter_mut().find(|line| line.key() == *key) {
            let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
            line.quantity = requested.min(line.stock_ceiling);
        }
    }

    /// Delete the line matching `key`. Unknown keys are a no-op.
    pub fn remove(&mut self, key: &LineKey) {
        self.items.retain(|line| line.key() != *key);
    }

    /// Sum of line totals. Pure; safe to call repeatedly for display.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Total unit count across all lines (navigation badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(),
            name: "Premium Puff Pro".to_owned(),
            image_url: Some("/img/premium-puff-pro.svg".to_owned()),
            price: Decimal::from(price),
            stock,
        }
    }

    fn flavor(value: &str, delta: Option<i64>, stock: u32) -> VariantSnapshot {
        VariantSnapshot {
            id: Some(VariantId::new()),
            name: "Flavor".to_owned(),
            value: value.to_owned(),
            price_delta: delta.map(Decimal::from),
            stock,
        }
    }

    #[test]
    fn test_double_add_merges_into_one_line() {
        let mut cart = Cart::new();
        let p = product(10, 5);
        cart.add(p.clone(), None);
        cart.add(p, None);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_distinct_variants_make_distinct_lines() {
        let mut cart = Cart::new();
        let p = product(20, 50);
        cart.add(p.clone(), Some(flavor("Red", Some(2), 10)));
        cart.add(p, Some(flavor("Blue", Some(0), 10)));

        assert_eq!(cart.items().len(), 2);
        // (20+2)*1 + (20+0)*1 = 42
        assert_eq!(cart.total(), Decimal::from(42));
    }

    #[test]
    fn test_add_clamps_at_stock_ceiling() {
        let mut cart = Cart::new();
        let p = product(10, 3);
        for _ in 0..4 {
            cart.add(p.clone(), None);
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), Decimal::from(30));
    }

    #[test]
    fn test_variant_stock_is_the_ceiling() {
        let mut cart = Cart::new();
        let p = product(10, 100);
        let v = flavor("Mint", None, 2);
        for _ in 0..5 {
            cart.add(p.clone(), Some(v.clone()));
        }

        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[0].stock_ceiling, 2);
    }

    #[test]
    fn test_same_variant_merges_by_id() {
        let mut cart = Cart::new();
        let p = product(15, 10);
        let v = flavor("Berry", Some(1), 8);
        cart.add(p.clone(), Some(v.clone()));
        cart.add(p, Some(v));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_variant_without_id_keys_by_value() {
        let mut cart = Cart::new();
        let p = product(15, 10);
        let mut v = flavor("Vanilla", None, 8);
        v.id = None;
        cart.add(p.clone(), Some(v.clone()));
        cart.add(p, Some(v));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_bare_key_never_equals_variant_key() {
        let p = product(10, 5);
        let bare = LineKey::resolve(p.id, None);
        let with_variant = LineKey::resolve(
            p.id,
            Some(&SelectedVariant {
                variant_id: None,
                variant_name: "Size".to_owned(),
                variant_value: String::new(),
                price_delta: None,
            }),
        );
        assert_ne!(bare, with_variant);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        let key = cart.add(product(10, 5), None);
        cart.update_quantity(&key, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let mut cart = Cart::new();
        let key = cart.add(product(10, 5), None);
        cart.update_quantity(&key, -5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_clamps_to_ceiling() {
        let mut cart = Cart::new();
        let key = cart.add(product(10, 7), None);
        cart.update_quantity(&key, 107);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn test_update_quantity_unknown_key_is_noop() {
        let mut cart = Cart::new();
        cart.add(product(10, 5), None);
        let before = cart.clone();
        cart.update_quantity(&LineKey::from("missing".to_owned()), 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_unknown_key_is_noop() {
        let mut cart = Cart::new();
        cart.add(product(10, 5), None);
        cart.remove(&LineKey::from("missing".to_owned()));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_deletes_only_the_matching_line() {
        let mut cart = Cart::new();
        let p = product(20, 50);
        let red = cart.add(p.clone(), Some(flavor("Red", Some(2), 10)));
        cart.add(p, Some(flavor("Blue", None, 10)));

        cart.remove(&red);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(
            cart.items()[0]
                .selected_variant
                .as_ref()
                .unwrap()
                .variant_value,
            "Blue"
        );
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(Cart::new().total(), Decimal::ZERO);
    }

    #[test]
    fn test_total_is_additive_over_disjoint_carts() {
        let mut a = Cart::new();
        a.add(product(10, 5), None);
        a.add(product(25, 5), None);

        let mut b = Cart::new();
        b.add(product(7, 9), Some(flavor("Strong", Some(3), 9)));

        let mut combined_items = a.items().to_vec();
        combined_items.extend(b.items().to_vec());
        let combined = Cart::from_items(combined_items);

        assert_eq!(combined.total(), a.total() + b.total());
    }

    #[test]
    fn test_zero_stock_add_is_skipped() {
        let mut cart = Cart::new();
        cart.add(product(10, 0), None);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = Cart::new();
        let p = product(10, 5);
        let key = cart.add(p.clone(), None);
        cart.add(p.clone(), Some(flavor("Mild", None, 4)));
        cart.update_quantity(&key, 3);

        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_snapshot_serde_roundtrip_preserves_order() {
        let mut cart = Cart::new();
        let p1 = product(29, 3);
        let p2 = product(24, 8);
        cart.add(p1, None);
        cart.add(p2, Some(flavor("Large", Some(5), 8)));

        let json = serde_json::to_string(cart.items()).unwrap();
        let items: Vec<CartLineItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(items, cart.items());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mut cart = Cart::new();
        cart.add(product(29, 3), Some(flavor("Mint", Some(2), 3)));
        let json = serde_json::to_string(cart.items()).unwrap();

        assert!(json.contains("\"productId\""));
        assert!(json.contains("\"basePrice\""));
        assert!(json.contains("\"stockCeiling\""));
        assert!(json.contains("\"selectedVariant\""));
        assert!(json.contains("\"priceDelta\""));
    }

    #[test]
    fn test_effective_unit_price_includes_delta() {
        let mut cart = Cart::new();
        cart.add(product(20, 10), Some(flavor("Large", Some(5), 10)));
        assert_eq!(cart.items()[0].unit_price(), Decimal::from(25));
    }
}
