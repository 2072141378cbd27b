//! Database operations for customer profiles.
//!
//! Customers map one-to-one onto upstream user accounts and materialize
//! lazily: the row is created on the first authenticated touch (profile
//! read or order placement) via an idempotent upsert.

use chrono::{DateTime, NaiveDate, Utc};
use clementine_core::{CustomerId, UserId};
use sqlx::{PgExecutor, PgPool};

use super::RepositoryError;

/// A customer profile.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Upstream user account this profile belongs to.
    pub user_id: UserId,
    /// Contact phone number, empty until the customer fills it in.
    pub phone_number: String,
    /// Optional birth date.
    pub birth_date: Option<NaiveDate>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Profile fields a customer may edit. The user link is immutable.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    /// Contact phone number.
    pub phone_number: String,
    /// Optional birth date.
    pub birth_date: Option<NaiveDate>,
}

const CUSTOMER_COLUMNS: &str = r"
    id,
    user_id,
    phone_number,
    birth_date,
    created_at,
    updated_at
";

/// List all customer profiles.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_customers(pool: &PgPool) -> Result<Vec<Customer>, RepositoryError> {
    let customers = sqlx::query_as::<_, Customer>(&format!(
        r"
        SELECT {CUSTOMER_COLUMNS}
        FROM customers
        ORDER BY id
        "
    ))
    .fetch_all(pool)
    .await?;

    Ok(customers)
}

/// Get the customer row for a user, creating it if this is the user's
/// first touch.
///
/// Takes any executor so order placement can run it inside its own
/// transaction. The no-op `DO UPDATE` makes the insert idempotent while
/// still returning the existing row.
///
/// # Errors
///
/// Returns error if the database upsert fails.
pub async fn get_or_create_by_user(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<Customer, RepositoryError> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        r"
        INSERT INTO customers (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING {CUSTOMER_COLUMNS}
        "
    ))
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(customer)
}

/// Update a user's profile fields, materializing the row if needed.
///
/// # Errors
///
/// Returns error if the database upsert fails.
pub async fn update_profile(
    pool: &PgPool,
    user_id: UserId,
    update: ProfileUpdate,
) -> Result<Customer, RepositoryError> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        r"
        INSERT INTO customers (user_id, phone_number, birth_date)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
        SET phone_number = EXCLUDED.phone_number,
            birth_date = EXCLUDED.birth_date,
            updated_at = NOW()
        RETURNING {CUSTOMER_COLUMNS}
        "
    ))
    .bind(user_id)
    .bind(update.phone_number)
    .bind(update.birth_date)
    .fetch_one(pool)
    .await?;

    Ok(customer)
}
