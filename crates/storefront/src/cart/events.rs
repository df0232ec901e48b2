//! Cart change notification.
//!
//! Every cart mutation publishes a payload-free signal. Observers (the
//! navigation badge, anything else watching the cart) re-load the snapshot
//! themselves - typically by hitting `GET /cart/count` - rather than
//! receiving cart data in the event.

use tokio::sync::broadcast;

/// Buffered signals per subscriber; laggards just observe a merged update.
const CHANNEL_CAPACITY: usize = 16;

/// Process-wide cart change signal.
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct CartEvents {
    tx: broadcast::Sender<()>,
}

impl CartEvents {
    /// Create a new signal channel.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Announce that some cart changed. Never fails; with no subscribers the
    /// signal is simply dropped.
    pub fn notify(&self) {
        let _ = self.tx.send(());
    }

    /// Subscribe to change signals.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_sees_notification() {
        let events = CartEvents::new();
        let mut rx = events.subscribe();
        events.notify();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_notify_without_subscribers_is_fine() {
        let events = CartEvents::new();
        events.notify();
    }

    #[tokio::test]
    async fn test_clones_share_the_channel() {
        let events = CartEvents::new();
        let mut rx = events.subscribe();
        events.clone().notify();
        assert!(rx.recv().await.is_ok());
    }
}
