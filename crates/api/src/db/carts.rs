//! Database operations for anonymous shopping carts.
//!
//! Carts are keyed by a random UUID generated application-side; holding
//! the id is the only handle on a cart. Line items always load with
//! their product's name and current base price joined in.

use chrono::{DateTime, Utc};
use clementine_core::{CartId, CartItemId, ProductId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{RepositoryError, fk_violation};

/// A shopping cart.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cart {
    /// Cart ID (random UUID).
    pub id: CartId,
    /// When the cart was opened.
    pub created_at: DateTime<Utc>,
}

/// A cart line item with its product joined in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemDetail {
    /// Line item ID.
    pub id: CartItemId,
    /// Owning cart.
    pub cart_id: CartId,
    /// Product in the line.
    pub product_id: ProductId,
    /// Product display name.
    pub product_name: String,
    /// Product's current tax-exclusive base price.
    pub unit_price: Decimal,
    /// Units of the product in the cart.
    pub quantity: i32,
}

/// Create a new empty cart with a freshly generated id.
///
/// # Errors
///
/// Returns error if the database insert fails.
pub async fn create_cart(pool: &PgPool) -> Result<Cart, RepositoryError> {
    let cart = sqlx::query_as::<_, Cart>(
        r"
        INSERT INTO carts (id)
        VALUES ($1)
        RETURNING id, created_at
        ",
    )
    .bind(CartId::new_random())
    .fetch_one(pool)
    .await?;

    Ok(cart)
}

/// Get a cart by ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_cart(pool: &PgPool, cart_id: CartId) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as::<_, Cart>(
        r"
        SELECT id, created_at
        FROM carts
        WHERE id = $1
        ",
    )
    .bind(cart_id)
    .fetch_optional(pool)
    .await?;

    Ok(cart)
}

/// Delete a cart and (via cascade) its line items.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the cart does not exist,
/// or another error if the database delete fails.
pub async fn delete_cart(pool: &PgPool, cart_id: CartId) -> Result<(), RepositoryError> {
    let result = sqlx::query(r"DELETE FROM carts WHERE id = $1")
        .bind(cart_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

const ITEM_COLUMNS: &str = r"
    ci.id,
    ci.cart_id,
    ci.product_id,
    p.name AS product_name,
    p.unit_price,
    ci.quantity
";

/// List a cart's line items, oldest first.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_items(
    pool: &PgPool,
    cart_id: CartId,
) -> Result<Vec<CartItemDetail>, RepositoryError> {
    let items = sqlx::query_as::<_, CartItemDetail>(&format!(
        r"
        SELECT {ITEM_COLUMNS}
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.id
        "
    ))
    .bind(cart_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Get one line item, scoped to its cart.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_item(
    pool: &PgPool,
    cart_id: CartId,
    item_id: CartItemId,
) -> Result<Option<CartItemDetail>, RepositoryError> {
    let item = sqlx::query_as::<_, CartItemDetail>(&format!(
        r"
        SELECT {ITEM_COLUMNS}
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1 AND ci.id = $2
        "
    ))
    .bind(cart_id)
    .bind(item_id)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

/// Add a product to a cart.
///
/// If the cart already holds a line for this product, the quantities are
/// summed in a single atomic upsert; concurrent adds of the same product
/// never race into two lines or a lost increment.
///
/// # Errors
///
/// Returns [`RepositoryError::InvalidReference`] if the product does not
/// exist, or another error if the database operations fail.
pub async fn upsert_item(
    pool: &PgPool,
    cart_id: CartId,
    product_id: ProductId,
    quantity: i32,
) -> Result<CartItemDetail, RepositoryError> {
    let item_id = sqlx::query_scalar::<_, CartItemId>(
        r"
        INSERT INTO cart_items (cart_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (cart_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING id
        ",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(pool)
    .await
    .map_err(|e| fk_violation(e, "no product with this id"))?;

    get_item(pool, cart_id, item_id)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Set the quantity of an existing line item.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the line does not exist in
/// this cart, or another error if the database update fails.
pub async fn set_item_quantity(
    pool: &PgPool,
    cart_id: CartId,
    item_id: CartItemId,
    quantity: i32,
) -> Result<CartItemDetail, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE cart_items
        SET quantity = $3
        WHERE cart_id = $1 AND id = $2
        ",
    )
    .bind(cart_id)
    .bind(item_id)
    .bind(quantity)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    get_item(pool, cart_id, item_id)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Remove a line item from a cart.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the line does not exist in
/// this cart, or another error if the database delete fails.
pub async fn remove_item(
    pool: &PgPool,
    cart_id: CartId,
    item_id: CartItemId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(r"DELETE FROM cart_items WHERE cart_id = $1 AND id = $2")
        .bind(cart_id)
        .bind(item_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}
