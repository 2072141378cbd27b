//! Background services.
//!
//! # Services
//!
//! - `events` - Order event bus and its spawned listeners

pub mod events;

pub use events::{EventBus, OrderCreated, spawn_listeners};
