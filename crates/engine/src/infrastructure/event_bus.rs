//! In-process event bus for domain events.
//!
//! Events fan out to every live subscriber over a `tokio::sync::broadcast`
//! channel. Publishing with no subscribers is not an error; slow subscribers
//! lag and lose the oldest events.

use async_trait::async_trait;
use dismissible_domain::DomainEvent;
use tokio::sync::broadcast;

use crate::infrastructure::ports::{EventBusError, EventPublisher};

pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 256;

/// Broadcast-backed [`EventPublisher`].
#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUS_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError> {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::trace!(event = name, receivers, "Published domain event");
            }
            Err(_) => {
                tracing::trace!(event = name, "No subscribers for domain event");
            }
        }
        Ok(())
    }
}

/// Drain events from a subscription into the log until the bus closes.
pub async fn log_events(mut receiver: broadcast::Receiver<DomainEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                tracing::info!(
                    event = event.name(),
                    item_id = %event.item_id(),
                    user_id = %event.user_id(),
                    "Domain event"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event log subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dismissible_domain::{DismissibleItem, ItemId, UserId};

    fn created_event() -> DomainEvent {
        let item_id = ItemId::new("tip").unwrap();
        let user_id = UserId::new("u1").unwrap();
        DomainEvent::ItemCreated {
            item: DismissibleItem::new(item_id.clone(), user_id.clone(), Utc::now()),
            item_id,
            user_id,
            context: None,
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = BroadcastEventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.publish(created_event()).await.is_ok());
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = BroadcastEventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(created_event()).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "ITEM_CREATED");
    }
}
