//! Clementine API library.
//!
//! This crate provides the store API functionality as a library,
//! allowing it to be tested and reused.
//!
//! The HTTP surface covers catalog browsing (categories, products,
//! comments), anonymous carts, cart-to-order conversion, and payment
//! settlement against an external gateway. Admin-only writes are gated by
//! a staff flag forwarded by the upstream authentication proxy.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
