//! Database operations for the store `PostgreSQL`.
//!
//! ## Tables
//!
//! - `categories` - Catalog categories
//! - `products` - Catalog products (slug, base unit price, inventory)
//! - `comments` - Product comments
//! - `carts` / `cart_items` - Anonymous carts keyed by random UUID
//! - `customers` - Customer profiles (one per upstream user account)
//! - `orders` / `order_items` - Orders with prices frozen at creation
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p clementine-cli -- migrate
//! ```

pub mod carts;
pub mod catalog;
pub mod comments;
pub mod customers;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A supplied reference points at a row that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Constraint violation (e.g., duplicate order line).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Result of a guarded delete.
///
/// Deletes of rows that other tables still reference are refused rather
/// than cascaded, and the caller reports the refusal to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was deleted.
    Deleted,
    /// The row was kept because `references` rows still point at it.
    Blocked {
        /// Number of referencing rows.
        references: i64,
    },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a foreign-key violation on `err` to [`RepositoryError::InvalidReference`]
/// with `message`, and anything else to [`RepositoryError::Database`].
pub(crate) fn fk_violation(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::InvalidReference(message.to_owned());
    }
    RepositoryError::Database(err)
}
