//! Payment gateway integration.
//!
//! This module provides:
//! - [`GatewayClient`] for requesting and verifying payments
//! - Wire types matching the gateway's JSON contract
//! - The order-total to gateway-unit amount conversion
//!
//! # Flow
//!
//! 1. `POST /orders/{id}/pay` requests a payment; the gateway issues an
//!    authority token and the client is redirected to the hosted page
//! 2. The customer pays (or cancels) on the gateway's page
//! 3. The gateway calls back `GET /orders/verify?Authority=..&Status=..`
//! 4. On an `OK` status the verify endpoint is called to settle the
//!    payment and the order is marked paid exactly once

mod client;
mod error;
mod types;

pub use client::GatewayClient;
pub use error::GatewayError;
pub use types::{VerifyOutcome, gateway_amount, status_description};
