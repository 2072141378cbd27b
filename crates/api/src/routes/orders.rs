//! Order route handlers.
//!
//! Staff see every order with customer contact details; other users see
//! only their own orders, without the customer block. A missing order and
//! someone else's order both answer 404 so the id space leaks nothing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use clementine_core::{
    CartId, CustomerId, OrderId, OrderItemId, OrderStatus, ProductId, UserId, line_total,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::DeleteOutcome;
use crate::db::orders::{self, CartConversionError, OrderWithItems};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireStaff, RequireUser};
use crate::services::OrderCreated;
use crate::state::AppState;

use super::money_scale;

/// Product summary embedded in order lines. No price here; the line
/// itself carries the unit price frozen at checkout.
#[derive(Debug, Serialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
}

/// One order line with the unit price frozen when the order was placed.
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub id: OrderItemId,
    pub product: ProductRef,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub line_total: Decimal,
}

impl From<orders::OrderItemDetail> for OrderItemView {
    fn from(item: orders::OrderItemDetail) -> Self {
        Self {
            id: item.id,
            line_total: line_total(item.unit_price, item.quantity),
            product: ProductRef {
                id: item.product_id,
                name: item.product_name,
            },
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Customer block shown to staff.
#[derive(Debug, Serialize)]
pub struct CustomerRef {
    pub id: CustomerId,
    pub user_id: UserId,
    pub phone_number: String,
}

/// Order as staff see it.
#[derive(Debug, Serialize)]
pub struct AdminOrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub customer: CustomerRef,
    pub items: Vec<OrderItemView>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Order as its owner sees it.
#[derive(Debug, Serialize)]
pub struct ClientOrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub items: Vec<OrderItemView>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Order response shaped for the caller.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OrderView {
    Admin(AdminOrderView),
    Client(ClientOrderView),
}

impl OrderView {
    /// Shape an order for the caller: staff get the customer block.
    #[must_use]
    pub fn for_caller(order: OrderWithItems, is_staff: bool) -> Self {
        let total_price = money_scale(order.total());
        let items = order.items.into_iter().map(Into::into).collect();
        if is_staff {
            Self::Admin(AdminOrderView {
                id: order.order.id,
                status: order.order.status,
                customer: CustomerRef {
                    id: order.order.customer_id,
                    user_id: order.order.customer_user_id,
                    phone_number: order.order.customer_phone_number,
                },
                items,
                total_price,
                created_at: order.order.created_at,
            })
        } else {
            Self::Client(ClientOrderView {
                id: order.order.id,
                status: order.order.status,
                items,
                total_price,
                created_at: order.order.created_at,
            })
        }
    }
}

/// Body for placing an order from a cart.
#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub cart_id: CartId,
}

/// Body for changing an order's status.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderBody {
    pub status: OrderStatus,
}

async fn load_for_caller(
    state: &AppState,
    user: CurrentUser,
    id: OrderId,
) -> Result<OrderWithItems> {
    let order = if user.is_staff {
        orders::get_order(state.pool(), id).await?
    } else {
        orders::get_order_for_user(state.pool(), id, user.user_id).await?
    };
    order.ok_or_else(|| AppError::NotFound("no order with this id".to_string()))
}

/// List orders: all of them for staff, the caller's own otherwise.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderView>>> {
    let orders = if user.is_staff {
        orders::list_orders(state.pool()).await?
    } else {
        orders::list_orders_for_user(state.pool(), user.user_id).await?
    };

    let views = orders
        .into_iter()
        .map(|order| OrderView::for_caller(order, user.is_staff))
        .collect();
    Ok(Json(views))
}

/// Get one order.
///
/// # Errors
///
/// Returns an error if the order does not exist, belongs to someone else,
/// or the query fails.
#[instrument(skip(state))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let order = load_for_caller(&state, user, id).await?;
    Ok(Json(OrderView::for_caller(order, user.is_staff)))
}

/// List one order's lines.
///
/// # Errors
///
/// Returns an error if the order does not exist, belongs to someone else,
/// or the query fails.
#[instrument(skip(state))]
pub async fn list_items(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<OrderItemView>>> {
    let order = load_for_caller(&state, user, id).await?;
    Ok(Json(order.items.into_iter().map(Into::into).collect()))
}

/// Place an order from a cart. The cart's lines become order lines with
/// the current prices frozen in, and the cart is deleted.
///
/// # Errors
///
/// Returns an error if the cart does not exist, is empty, or the
/// conversion fails.
#[instrument(skip(state, body))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let order = orders::create_from_cart(state.pool(), user.user_id, body.cart_id)
        .await
        .map_err(|err| match err {
            CartConversionError::NoSuchCart | CartConversionError::EmptyCart => {
                AppError::Validation(err.to_string())
            }
            CartConversionError::Repository(e) => e.into(),
        })?;

    state.events().publish(OrderCreated {
        order_id: order.order.id,
        customer_id: order.order.customer_id,
        total_price: order.total(),
        item_count: order.items.len(),
        created_at: order.order.created_at,
    });

    Ok((
        StatusCode::CREATED,
        Json(OrderView::for_caller(order, user.is_staff)),
    ))
}

/// Set an order's status.
///
/// # Errors
///
/// Returns an error if the order does not exist or the update fails.
#[instrument(skip(state, body))]
pub async fn update(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderBody>,
) -> Result<Json<OrderView>> {
    let order = orders::set_status(state.pool(), id, body.status).await?;
    Ok(Json(OrderView::for_caller(order, user.is_staff)))
}

/// Delete an order, refusing while it still has lines.
///
/// # Errors
///
/// Returns an error if the order does not exist, still has lines, or the
/// delete fails.
#[instrument(skip(state))]
pub async fn remove(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    match orders::delete_order(state.pool(), id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Blocked { references } => Err(AppError::DeletionBlocked(format!(
            "this order still has {references} items; remove them first"
        ))),
    }
}
