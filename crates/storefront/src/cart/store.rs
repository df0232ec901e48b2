//! Session-backed cart persistence.
//!
//! The cart snapshot lives in the browsing session's key-value store under a
//! fixed key, serialized as a JSON array of line items. That store is the
//! server-side stand-in for the original's `localStorage`: per browsing
//! session, survives reload through the session cookie, cleared on order
//! completion.
//!
//! Concurrent requests in the same session (two tabs) each hold an
//! independent in-memory copy and reconcile by last-write-wins on `save`.
//! That race is an accepted property of the design, not a defect; see the
//! tests below.

use tower_sessions::Session;

use puffshop_core::cart::{Cart, CartLineItem};

/// Fixed session key the snapshot is stored under.
pub const CART_KEY: &str = "cart";

/// Errors from the session store.
///
/// Only `save`/`clear` surface these; `load` collapses every failure to the
/// empty cart at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum CartStoreError {
    /// The session layer failed to read or write.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Handle to one browsing session's cart snapshot.
///
/// Explicitly constructed per request from the request's [`Session`]; there
/// is no ambient cart singleton.
#[derive(Debug, Clone)]
pub struct CartStore {
    session: Session,
}

impl CartStore {
    /// Wrap a request session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Load the persisted snapshot, degrading every failure to empty.
    ///
    /// A missing key, a corrupt payload, or a store failure all read as "the
    /// cart is empty" - the storefront never errors on display.
    pub async fn load(&self) -> Cart {
        match self.load_or_error().await {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!("discarding unreadable cart snapshot: {e}");
                Cart::new()
            }
        }
    }

    /// Load the persisted snapshot, keeping the failure observable.
    ///
    /// This is the un-collapsed form of [`CartStore::load`], so tests can
    /// assert the recovery path deliberately.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::Session` if the stored payload cannot be
    /// read or does not deserialize as a line-item array.
    pub async fn load_or_error(&self) -> Result<Cart, CartStoreError> {
        let items = self.session.get::<Vec<CartLineItem>>(CART_KEY).await?;
        Ok(items.map_or_else(Cart::new, Cart::from_items))
    }

    /// Persist the full snapshot, replacing any prior one.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::Session` if the write fails.
    pub async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session.insert(CART_KEY, cart.items()).await?;
        Ok(())
    }

    /// Remove the persisted snapshot entirely.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::Session` if the removal fails.
    pub async fn clear(&self) -> Result<(), CartStoreError> {
        // remove_value: clearing must work even when the payload is corrupt.
        self.session.remove_value(CART_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tower_sessions::{MemoryStore, Session};

    use puffshop_core::ProductId;
    use puffshop_core::cart::ProductSnapshot;

    use super::*;

    fn fresh_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn snapshot(price: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(),
            name: "Premium Puff Pro".to_owned(),
            image_url: None,
            price: Decimal::from(price),
            stock,
        }
    }

    #[tokio::test]
    async fn test_load_of_absent_snapshot_is_empty() {
        let store = CartStore::new(fresh_session());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip_preserves_order() {
        let session = fresh_session();
        let store = CartStore::new(session);

        let mut cart = Cart::new();
        cart.add(snapshot(10, 5), None);
        cart.add(snapshot(25, 2), None);
        store.save(&cart).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.items(), cart.items());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_degrades_to_empty() {
        let session = fresh_session();
        session.insert(CART_KEY, "not a cart").await.unwrap();

        let store = CartStore::new(session);
        assert!(store.load_or_error().await.is_err());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_the_snapshot() {
        let store = CartStore::new(fresh_session());

        let mut cart = Cart::new();
        cart.add(snapshot(10, 5), None);
        store.save(&cart).await.unwrap();
        assert!(!store.load().await.is_empty());

        store.clear().await.unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_handles_reconcile_last_write_wins() {
        // Two tabs: each loads its own copy, mutates, and saves. The second
        // save replaces the first wholesale - the documented policy.
        let session = fresh_session();
        let tab_a = CartStore::new(session.clone());
        let tab_b = CartStore::new(session);

        let mut cart_a = tab_a.load().await;
        let mut cart_b = tab_b.load().await;

        cart_a.add(snapshot(10, 5), None);
        cart_b.add(snapshot(99, 5), None);

        tab_a.save(&cart_a).await.unwrap();
        tab_b.save(&cart_b).await.unwrap();

        let final_cart = tab_a.load().await;
        assert_eq!(final_cart.items(), cart_b.items());
        assert_eq!(final_cart.total(), Decimal::from(99));
    }
}
