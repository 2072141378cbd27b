//! Seed the catalog with demo data.
//!
//! Inserts a small set of grocery categories and products for local
//! development. Runs only against an empty catalog; a database that
//! already has categories is left untouched.
//!
//! # Usage
//!
//! ```bash
//! clem-cli seed
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string for the store

use clementine_core::slugify;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Demo catalog: category title, category description, and products as
/// (name, description, unit price in cents, inventory).
const DEMO_CATALOG: &[(&str, &str, &[(&str, &str, i64, i32)])] = &[
    (
        "Citrus",
        "Fresh citrus fruit, picked this week",
        &[
            (
                "Clementine Crate",
                "A 2.3kg wooden crate of seedless clementines",
                1250,
                40,
            ),
            ("Blood Orange Bag", "1kg of Sicilian blood oranges", 680, 25),
            ("Meyer Lemon Box", "A dozen fragrant Meyer lemons", 540, 30),
        ],
    ),
    (
        "Pantry Staples",
        "Everyday basics for a stocked kitchen",
        &[
            ("Arborio Rice 1kg", "Short-grain rice for risotto", 450, 60),
            (
                "Orange Blossom Honey",
                "Raw honey from citrus groves, 340g jar",
                890,
                18,
            ),
            (
                "Extra Virgin Olive Oil",
                "Cold-pressed, 750ml bottle",
                1475,
                22,
            ),
        ],
    ),
    (
        "Beverages",
        "Juices and sodas",
        &[
            (
                "Clementine Juice 6-pack",
                "Six 250ml bottles, not from concentrate",
                990,
                35,
            ),
            (
                "Sparkling Citrus Soda",
                "330ml can, lightly sweetened",
                210,
                120,
            ),
        ],
    ),
];

/// Seed the catalog with demo categories and products.
///
/// # Errors
///
/// Returns an error if `API_DATABASE_URL` is missing, the database is
/// unreachable, or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    // Same fallback the API uses (Fly.io postgres attach sets DATABASE_URL).
    let database_url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("API_DATABASE_URL"))?;

    info!("Connecting to store database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        info!(categories = existing, "Catalog already has data, skipping seed");
        return Ok(());
    }

    let mut inserted = 0_usize;
    for &(title, description, products) in DEMO_CATALOG {
        let category_id: i32 = sqlx::query_scalar(
            r"INSERT INTO categories (title, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(title)
        .bind(description)
        .fetch_one(&pool)
        .await?;

        for &(name, blurb, cents, inventory) in products {
            sqlx::query(
                r"
                INSERT INTO products (name, slug, description, unit_price, inventory, category_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(name)
            .bind(slugify(name))
            .bind(blurb)
            .bind(Decimal::new(cents, 2))
            .bind(inventory)
            .bind(category_id)
            .execute(&pool)
            .await?;
            inserted += 1;
        }
    }

    info!(
        categories = DEMO_CATALOG.len(),
        products = inserted,
        "Seed complete"
    );
    Ok(())
}
