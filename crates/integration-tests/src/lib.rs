//! Integration tests for Clementine.
//!
//! # Running Tests
//!
//! ```bash
//! # Self-contained tests (view shaping, gateway client, event bus)
//! cargo test -p clementine-integration-tests
//!
//! # End-to-end tests against a live server
//! clem-cli migrate
//! cargo run -p clementine-api &
//! cargo test -p clementine-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_store_views` - Response shaping for carts, products, and orders
//! - `api_gateway` - Payment gateway client against an in-process stub
//! - `api_events` - Order event bus fan-out
//! - `api_store_flows` - HTTP flows against a running server (`#[ignore]`)
//!
//! The gateway tests bind a loopback listener; nothing here needs a
//! database or the network beyond 127.0.0.1.
