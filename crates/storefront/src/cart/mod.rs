//! The cart manager: session store + pure operations + change signal.
//!
//! The pure half (line items, identity keys, merge/clamp/total logic) lives
//! in `puffshop_core::cart`. This module owns the stateful half: every
//! mutating operation loads the session snapshot, applies a pure operation,
//! saves the result back, and then signals observers.

mod events;
mod store;

pub use events::CartEvents;
pub use store::{CART_KEY, CartStore, CartStoreError};

use puffshop_core::cart::{Cart, LineKey, ProductSnapshot, VariantSnapshot};

/// One browsing session's cart, with persistence and notification wired in.
///
/// Constructed per request; the store handle is passed in explicitly rather
/// than living in any global.
pub struct CartManager {
    store: CartStore,
    events: CartEvents,
}

impl CartManager {
    /// Assemble a manager from a session store handle and the shared signal.
    #[must_use]
    pub const fn new(store: CartStore, events: CartEvents) -> Self {
        Self { store, events }
    }

    /// Current snapshot (read-only; no signal).
    pub async fn snapshot(&self) -> Cart {
        self.store.load().await
    }

    /// Add one unit of a product (with optional variant), merging by
    /// identity key and clamping at the line's stock ceiling.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError` if persisting the mutated snapshot fails;
    /// the signal only fires after a successful save.
    pub async fn add(
        &self,
        product: ProductSnapshot,
        variant: Option<VariantSnapshot>,
    ) -> Result<Cart, CartStoreError> {
        let mut cart = self.store.load().await;
        cart.add(product, variant);
        self.store.save(&cart).await?;
        self.events.notify();
        Ok(cart)
    }

    /// Set a line's quantity; zero or negative removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError` if persisting fails.
    pub async fn update_quantity(
        &self,
        key: &LineKey,
        quantity: i64,
    ) -> Result<Cart, CartStoreError> {
        let mut cart = self.store.load().await;
        cart.update_quantity(key, quantity);
        self.store.save(&cart).await?;
        self.events.notify();
        Ok(cart)
    }

    /// Remove a line. Unknown keys are a no-op (still persisted, still
    /// signalled, so observers converge).
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError` if persisting fails.
    pub async fn remove(&self, key: &LineKey) -> Result<Cart, CartStoreError> {
        let mut cart = self.store.load().await;
        cart.remove(key);
        self.store.save(&cart).await?;
        self.events.notify();
        Ok(cart)
    }

    /// Destroy the snapshot (order completed, or explicit user action).
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError` if the removal fails.
    pub async fn clear(&self) -> Result<(), CartStoreError> {
        self.store.clear().await?;
        self.events.notify();
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

    use super::*;

    fn manager() -> (CartManager, CartEvents) {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let events = CartEvents::new();
        (
            CartManager::new(CartStore::new(session), events.clone()),
            events,
        )
    }

    fn snapshot(price: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(),
            name: "Berry Blast Puff".to_owned(),
            image_url: None,
            price: Decimal::from(price),
            stock,
        }
    }

    #[tokio::test]
    async fn test_add_persists_across_loads() {
        let (manager, _events) = manager();
        manager.add(snapshot(27, 60), None).await.unwrap();

        let cart = manager.snapshot().await;
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), Decimal::from(27));
    }

    #[tokio::test]
    async fn test_mutations_signal_observers() {
        let (manager, events) = manager();
        let mut rx = events.subscribe();

        manager.add(snapshot(27, 60), None).await.unwrap();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_signals_and_empties() {
        let (manager, events) = manager();
        manager.add(snapshot(27, 60), None).await.unwrap();

        let mut rx = events.subscribe();
        manager.clear().await.unwrap();
        assert!(rx.recv().await.is_ok());
        assert!(manager.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove_converge() {
        let (manager, _events) = manager();
        let product = snapshot(10, 5);
        let cart = manager.add(product, None).await.unwrap();
        let key = cart.items()[0].key();

        let cart = manager.update_quantity(&key, 3).await.unwrap();
        assert_eq!(cart.items()[0].quantity, 3);

        let cart = manager.remove(&key).await.unwrap();
        assert!(cart.is_empty());
    }
}
