//! Event Bus Adapter
//!
//! Broadcasts swap events to live relayer subscriptions and keeps an
//! append-only log for late readers.

use crate::events::SwapEvent;
use crate::ports::outbound::EventPublisher;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default broadcast buffer per subscriber.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// In-memory event bus.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SwapEvent>,
    log: RwLock<Vec<SwapEvent>>,
    events_published: AtomicU64,
}

impl InMemoryEventBus {
    /// Bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            log: RwLock::new(Vec::new()),
            events_published: AtomicU64::new(0),
        }
    }

    /// Live subscription; sees events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
        self.sender.subscribe()
    }

    /// Full event log, oldest first.
    pub fn events(&self) -> Vec<SwapEvent> {
        self.log.read().clone()
    }

    /// Logged events on `topic`.
    pub fn events_for_topic(&self, topic: &str) -> Vec<SwapEvent> {
        self.log
            .read()
            .iter()
            .filter(|e| e.topic() == topic)
            .cloned()
            .collect()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: SwapEvent) -> usize {
        let topic = event.topic();
        let id = event.swap_id();

        self.log.write().push(event.clone());
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic, swap_id = %id, receivers, "Event published");
                receivers
            }
            Err(_) => {
                warn!(topic, swap_id = %id, "Event logged with no live subscribers");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, SwapId};
    use crate::events::topics;

    fn cancelled(byte: u8) -> SwapEvent {
        SwapEvent::SwapCancelled {
            id: SwapId([byte; 32]),
            escrow_address: Address::ZERO,
        }
    }

    #[tokio::test]
    async fn test_publish_no_subscribers_still_logs() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.publish(cancelled(1)).await, 0);
        assert_eq!(bus.events_published(), 1);
        assert_eq!(bus.events(), vec![cancelled(1)]);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = InMemoryEventBus::new();
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(cancelled(1)).await, 1);
        bus.publish(cancelled(2)).await;

        assert_eq!(rx.recv().await.unwrap(), cancelled(1));
        assert_eq!(rx.recv().await.unwrap(), cancelled(2));
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_events_for_topic() {
        let bus = InMemoryEventBus::new();
        bus.publish(cancelled(1)).await;
        assert_eq!(bus.events_for_topic(topics::SWAP_CANCELLED).len(), 1);
        assert!(bus.events_for_topic(topics::SWAP_COMPLETED).is_empty());
    }
}
