//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod slug;
pub mod status;

pub use id::*;
pub use money::{line_total, price_after_tax, total};
pub use slug::slugify;
pub use status::OrderStatus;
