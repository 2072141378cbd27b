//! Database operations for orders.
//!
//! Orders always load with their customer joined in and, for the
//! `OrderWithItems` shape, with their line items prefetched in a second
//! query. Item unit prices are frozen copies taken from the product at
//! order creation and never change afterwards.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clementine_core::{
    CartId, CustomerId, OrderId, OrderItemId, OrderStatus, ProductId, UserId,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use super::{DeleteOutcome, RepositoryError, customers};

/// An order header with its customer joined in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Payment status.
    pub status: OrderStatus,
    /// Authority token issued by the payment gateway, set once payment
    /// has been initiated.
    pub gateway_authority: Option<String>,
    /// Reference id returned by the gateway on successful verification.
    pub gateway_ref_id: Option<i64>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Upstream user account of the customer.
    pub customer_user_id: UserId,
    /// Customer's phone number.
    pub customer_phone_number: String,
}

/// An order line item with its product's name joined in.
///
/// `unit_price` is the price frozen at order creation, not the product's
/// current price.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemDetail {
    /// Line item ID.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Product in the line.
    pub product_id: ProductId,
    /// Product display name.
    pub product_name: String,
    /// Units ordered.
    pub quantity: i32,
    /// Tax-exclusive unit price frozen at order creation.
    pub unit_price: Decimal,
}

/// An order header together with its line items.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    /// The order header.
    pub order: Order,
    /// The order's line items.
    pub items: Vec<OrderItemDetail>,
}

impl OrderWithItems {
    /// Order total computed from the frozen line prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        clementine_core::total(self.items.iter().map(|i| (i.unit_price, i.quantity)))
    }
}

/// Why a cart could not be converted into an order.
///
/// The two client-caused cases carry the exact messages shown to the
/// client so it can tell a stale cart id apart from an empty cart.
#[derive(Debug, Error)]
pub enum CartConversionError {
    /// The cart id does not match any open cart.
    #[error("there is no cart with this id")]
    NoSuchCart,

    /// The cart exists but holds no line items.
    #[error("the cart is empty; add a product to it first")]
    EmptyCart,

    /// The conversion failed for a non-client reason.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CartConversionError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::from(err))
    }
}

const ORDER_COLUMNS: &str = r"
    o.id,
    o.customer_id,
    o.status,
    o.gateway_authority,
    o.gateway_ref_id,
    o.created_at,
    c.user_id AS customer_user_id,
    c.phone_number AS customer_phone_number
";

const ITEM_COLUMNS: &str = r"
    oi.id,
    oi.order_id,
    oi.product_id,
    p.name AS product_name,
    oi.quantity,
    oi.unit_price
";

/// List all orders with their items, newest first.
///
/// # Errors
///
/// Returns error if the database queries fail.
pub async fn list_orders(pool: &PgPool) -> Result<Vec<OrderWithItems>, RepositoryError> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        ORDER BY o.id DESC
        "
    ))
    .fetch_all(pool)
    .await?;

    attach_items(pool, orders).await
}

/// List a user's own orders with their items, newest first.
///
/// # Errors
///
/// Returns error if the database queries fail.
pub async fn list_orders_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<OrderWithItems>, RepositoryError> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE c.user_id = $1
        ORDER BY o.id DESC
        "
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    attach_items(pool, orders).await
}

/// Prefetch the items for a batch of orders in one query and stitch them
/// onto their headers.
async fn attach_items(
    pool: &PgPool,
    orders: Vec<Order>,
) -> Result<Vec<OrderWithItems>, RepositoryError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
    let items = sqlx::query_as::<_, OrderItemDetail>(&format!(
        r"
        SELECT {ITEM_COLUMNS}
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.id
        "
    ))
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    let mut items_by_order: HashMap<OrderId, Vec<OrderItemDetail>> = HashMap::new();
    for item in items {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect())
}

/// Get an order with its items by ID.
///
/// # Errors
///
/// Returns error if the database queries fail.
pub async fn get_order(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<Option<OrderWithItems>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE o.id = $1
        "
    ))
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = load_items(pool, order.id).await?;
    Ok(Some(OrderWithItems { order, items }))
}

/// Get an order with its items, scoped to the owning user.
///
/// Returns `None` both for unknown orders and for orders that belong to
/// someone else, so callers cannot leak another customer's order ids.
///
/// # Errors
///
/// Returns error if the database queries fail.
pub async fn get_order_for_user(
    pool: &PgPool,
    order_id: OrderId,
    user_id: UserId,
) -> Result<Option<OrderWithItems>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE o.id = $1 AND c.user_id = $2
        "
    ))
    .bind(order_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = load_items(pool, order.id).await?;
    Ok(Some(OrderWithItems { order, items }))
}

async fn load_items(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<Vec<OrderItemDetail>, RepositoryError> {
    let items = sqlx::query_as::<_, OrderItemDetail>(&format!(
        r"
        SELECT {ITEM_COLUMNS}
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = $1
        ORDER BY oi.id
        "
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Convert a cart into an order for the given user, atomically.
///
/// Inside one transaction: the customer row is resolved (created on
/// first touch), the cart's lines are read joined with current product
/// prices, the order header and its items are inserted with the prices
/// frozen, and the cart is deleted. Any early return rolls the whole
/// transaction back, so a failed conversion leaves the cart untouched.
///
/// # Errors
///
/// Returns [`CartConversionError::NoSuchCart`] or
/// [`CartConversionError::EmptyCart`] for the two client-caused cases,
/// or a repository error if the database operations fail.
pub async fn create_from_cart(
    pool: &PgPool,
    user_id: UserId,
    cart_id: CartId,
) -> Result<OrderWithItems, CartConversionError> {
    let mut tx = pool.begin().await?;

    let customer = customers::get_or_create_by_user(&mut *tx, user_id).await?;

    let cart_exists =
        sqlx::query_scalar::<_, bool>(r"SELECT EXISTS (SELECT 1 FROM carts WHERE id = $1)")
            .bind(cart_id)
            .fetch_one(&mut *tx)
            .await?;
    if !cart_exists {
        return Err(CartConversionError::NoSuchCart);
    }

    let line_count =
        sqlx::query_scalar::<_, i64>(r"SELECT COUNT(*) FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .fetch_one(&mut *tx)
            .await?;
    if line_count == 0 {
        return Err(CartConversionError::EmptyCart);
    }

    let order_id =
        sqlx::query_scalar::<_, OrderId>(r"INSERT INTO orders (customer_id) VALUES ($1) RETURNING id")
            .bind(customer.id)
            .fetch_one(&mut *tx)
            .await?;

    // Freeze the current product prices into the order lines.
    sqlx::query(
        r"
        INSERT INTO order_items (order_id, product_id, quantity, unit_price)
        SELECT $1, ci.product_id, ci.quantity, p.unit_price
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $2
        ",
    )
    .bind(order_id)
    .bind(cart_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(r"DELETE FROM carts WHERE id = $1")
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE o.id = $1
        "
    ))
    .bind(order_id)
    .fetch_one(&mut *tx)
    .await?;

    let items = sqlx::query_as::<_, OrderItemDetail>(&format!(
        r"
        SELECT {ITEM_COLUMNS}
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = $1
        ORDER BY oi.id
        "
    ))
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(OrderWithItems { order, items })
}

/// Set an order's status (admin edit).
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the order does not exist,
/// or another error if the database update fails.
pub async fn set_status(
    pool: &PgPool,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<OrderWithItems, RepositoryError> {
    let result = sqlx::query(r"UPDATE orders SET status = $2 WHERE id = $1")
        .bind(order_id)
        .bind(status)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    get_order(pool, order_id)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Delete an order unless line items still belong to it.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the order does not exist,
/// or another error if the database operations fail.
pub async fn delete_order(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<DeleteOutcome, RepositoryError> {
    let mut tx = pool.begin().await?;

    let references =
        sqlx::query_scalar::<_, i64>(r"SELECT COUNT(*) FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;

    if references > 0 {
        return Ok(DeleteOutcome::Blocked { references });
    }

    let result = sqlx::query(r"DELETE FROM orders WHERE id = $1")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    tx.commit().await?;
    Ok(DeleteOutcome::Deleted)
}

/// Store the authority token the gateway issued for an order's payment.
///
/// A retried payment attempt overwrites the previous token; only the
/// latest authority can settle the order.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the order does not exist,
/// or another error if the database update fails.
pub async fn set_authority(
    pool: &PgPool,
    order_id: OrderId,
    authority: &str,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(r"UPDATE orders SET gateway_authority = $2 WHERE id = $1")
        .bind(order_id)
        .bind(authority)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Look up an order with its items by the gateway authority token.
///
/// # Errors
///
/// Returns error if the database queries fail.
pub async fn get_by_authority(
    pool: &PgPool,
    authority: &str,
) -> Result<Option<OrderWithItems>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE o.gateway_authority = $1
        "
    ))
    .bind(authority)
    .fetch_optional(pool)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = load_items(pool, order.id).await?;
    Ok(Some(OrderWithItems { order, items }))
}

/// Mark the order behind an authority token as paid and record the
/// gateway's reference id.
///
/// The row is locked for the duration of the transaction; an order that
/// is already `paid` is returned unchanged with its original reference
/// id, so verification replays cannot double-credit.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if no order carries this
/// authority, or another error if the database operations fail.
pub async fn mark_paid(
    pool: &PgPool,
    authority: &str,
    ref_id: i64,
) -> Result<Order, RepositoryError> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE o.gateway_authority = $1
        FOR UPDATE OF o
        "
    ))
    .bind(authority)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    if order.status == OrderStatus::Paid {
        return Ok(order);
    }

    sqlx::query(r"UPDATE orders SET status = 'paid', gateway_ref_id = $2 WHERE id = $1")
        .bind(order.id)
        .bind(ref_id)
        .execute(&mut *tx)
        .await?;

    let paid = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE o.id = $1
        "
    ))
    .bind(order.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(paid)
}
