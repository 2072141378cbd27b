//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! clem-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string for the store

use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run store database migrations.
///
/// # Errors
///
/// Returns an error if `API_DATABASE_URL` is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    // Same fallback the API uses (Fly.io postgres attach sets DATABASE_URL).
    let database_url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("API_DATABASE_URL"))?;

    tracing::info!("Connecting to store database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running store migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Store migrations complete!");
    Ok(())
}
