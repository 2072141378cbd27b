//! Integration tests for the order event bus.
//!
//! Listeners are independent broadcast subscribers; one consumer dying
//! or falling behind must never affect the others or the publisher.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use clementine_api::services::{EventBus, OrderCreated};
use clementine_core::{CustomerId, OrderId};

fn sample_event(order_id: i32) -> OrderCreated {
    OrderCreated {
        order_id: OrderId::new(order_id),
        customer_id: CustomerId::new(3),
        total_price: Decimal::new(2248, 2),
        item_count: 2,
        created_at: Utc
            .with_ymd_and_hms(2026, 8, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[tokio::test]
async fn test_every_subscriber_sees_every_event() {
    let bus = EventBus::new();
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();

    bus.publish(sample_event(1));
    bus.publish(sample_event(2));

    for rx in [&mut first, &mut second] {
        let a = rx.recv().await.expect("first event");
        let b = rx.recv().await.expect("second event");
        assert_eq!(a.order_id, OrderId::new(1));
        assert_eq!(b.order_id, OrderId::new(2));
    }
}

#[tokio::test]
async fn test_dead_subscriber_leaves_others_working() {
    let bus = EventBus::new();
    let mut healthy = bus.subscribe();
    let failing = bus.subscribe();
    drop(failing);

    bus.publish(sample_event(1));

    let got = healthy.recv().await.expect("surviving subscriber receives");
    assert_eq!(got.order_id, OrderId::new(1));
}

#[tokio::test]
async fn test_publish_without_subscribers_is_a_noop() {
    let bus = EventBus::new();
    bus.publish(sample_event(1));

    // A subscription opened afterwards starts at the present
    let mut late = bus.subscribe();
    bus.publish(sample_event(2));
    let got = late.recv().await.expect("late subscriber receives");
    assert_eq!(got.order_id, OrderId::new(2));
}

#[test]
fn test_webhook_payload_shape() {
    // The webhook listener POSTs the event as-is; money is a string.
    let payload = serde_json::to_value(sample_event(7)).expect("event should serialize");

    assert_eq!(payload["order_id"], json!(7));
    assert_eq!(payload["customer_id"], json!(3));
    assert_eq!(payload["total_price"], json!("22.48"));
    assert_eq!(payload["item_count"], json!(2));
    assert!(payload["created_at"].is_string());
}
