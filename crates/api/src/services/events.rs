//! In-process fan-out of order events.
//!
//! Order placement publishes an [`OrderCreated`] event after its
//! transaction has committed. Listeners are independent spawned tasks,
//! each holding its own receiver: one listener failing, lagging, or
//! blocking never affects the others and never affects the request that
//! published the event.

use chrono::{DateTime, Utc};
use clementine_core::{CustomerId, OrderId};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Buffered events per subscriber before a slow listener starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Event published after an order has been created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreated {
    /// The created order.
    pub order_id: OrderId,
    /// Customer who placed it.
    pub customer_id: CustomerId,
    /// Order total from the frozen line prices.
    pub total_price: Decimal,
    /// Number of line items.
    pub item_count: usize,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// Broadcast bus carrying order events to in-process listeners.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<OrderCreated>,
}

impl EventBus {
    /// Create a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Publishing with no subscribers drops the event silently.
    pub fn publish(&self, event: OrderCreated) {
        match self.sender.send(event) {
            Ok(listeners) => debug!(listeners, "Order event published"),
            Err(_) => debug!("Order event dropped, no listeners subscribed"),
        }
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrderCreated> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the order event listeners.
///
/// Always spawns the audit listener; spawns the webhook listener only
/// when `ORDER_WEBHOOK_URL` is configured.
pub fn spawn_listeners(state: &AppState) {
    spawn_audit_listener(state.events().subscribe());

    if let Some(url) = state.config().order_webhook_url.clone() {
        spawn_webhook_listener(state.events().subscribe(), url);
    } else {
        debug!("ORDER_WEBHOOK_URL not set, skipping webhook listener");
    }
}

/// Audit listener: one log line per placed order.
fn spawn_audit_listener(mut receiver: broadcast::Receiver<OrderCreated>) {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    info!(
                        order_id = %event.order_id,
                        customer_id = %event.customer_id,
                        total_price = %event.total_price,
                        item_count = event.item_count,
                        "Order placed"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Audit listener lagged behind order events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Webhook listener: POSTs each event as JSON to the configured URL.
/// Delivery failures are logged and dropped.
fn spawn_webhook_listener(mut receiver: broadcast::Receiver<OrderCreated>, url: String) {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let delivery = client
                        .post(&url)
                        .json(&event)
                        .send()
                        .await
                        .and_then(reqwest::Response::error_for_status);
                    if let Err(e) = delivery {
                        error!(
                            error = %e,
                            order_id = %event.order_id,
                            "Order webhook delivery failed"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Webhook listener lagged behind order events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clementine_core::{CustomerId, OrderId};

    use super::*;

    fn sample_event(order_id: i32) -> OrderCreated {
        OrderCreated {
            order_id: OrderId::new(order_id),
            customer_id: CustomerId::new(1),
            total_price: Decimal::new(25_00, 2),
            item_count: 2,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_publish_without_listeners_is_a_noop() {
        let bus = EventBus::new();
        bus.publish(sample_event(1));
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        let event = sample_event(7);
        bus.publish(event.clone());

        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_its_own_copy() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(sample_event(9));

        assert_eq!(first.recv().await.unwrap().order_id, OrderId::new(9));
        assert_eq!(second.recv().await.unwrap().order_id, OrderId::new(9));
    }

    #[tokio::test]
    async fn test_subscription_starts_at_the_present() {
        let bus = EventBus::new();
        let mut early = bus.subscribe();
        bus.publish(sample_event(1));

        let mut late = bus.subscribe();
        bus.publish(sample_event(2));

        assert_eq!(early.recv().await.unwrap().order_id, OrderId::new(1));
        assert_eq!(early.recv().await.unwrap().order_id, OrderId::new(2));
        assert_eq!(late.recv().await.unwrap().order_id, OrderId::new(2));
    }
}
