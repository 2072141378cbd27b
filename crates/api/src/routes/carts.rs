//! Cart route handlers.
//!
//! Carts are anonymous. Creating one returns a random UUID the client keeps
//! hold of; anyone holding the id can read or modify the cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use clementine_core::{CartId, CartItemId, ProductId, line_total, total};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::carts;
use crate::error::{AppError, Result};
use crate::state::AppState;

use super::money_scale;

/// Product summary embedded in cart lines. Carries the current unit price.
#[derive(Debug, Serialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
}

/// One cart line with its computed total.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub id: CartItemId,
    pub product: ProductRef,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub line_total: Decimal,
}

impl From<carts::CartItemDetail> for CartItemView {
    fn from(item: carts::CartItemDetail) -> Self {
        Self {
            id: item.id,
            line_total: line_total(item.unit_price, item.quantity),
            product: ProductRef {
                id: item.product_id,
                name: item.product_name,
                unit_price: item.unit_price,
            },
            quantity: item.quantity,
        }
    }
}

/// Cart display data with all lines and the cart total.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartItemView>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl CartView {
    /// Assemble the cart response from its row and lines.
    #[must_use]
    pub fn build(cart: carts::Cart, items: Vec<carts::CartItemDetail>) -> Self {
        let total_price = total(items.iter().map(|item| (item.unit_price, item.quantity)));
        Self {
            id: cart.id,
            items: items.into_iter().map(Into::into).collect(),
            total_price: money_scale(total_price),
            created_at: cart.created_at,
        }
    }
}

/// Body for adding a product to a cart.
#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Body for changing a cart line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    pub quantity: i32,
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be positive".to_string(),
        ));
    }
    Ok(())
}

async fn load_cart(state: &AppState, id: CartId) -> Result<carts::Cart> {
    carts::get_cart(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("no cart with this id".to_string()))
}

/// Create an empty cart.
///
/// # Errors
///
/// Returns an error if the database insert fails.
#[instrument(skip(state))]
pub async fn create(State(state): State<AppState>) -> Result<(StatusCode, Json<CartView>)> {
    let cart = carts::create_cart(state.pool()).await?;
    Ok((StatusCode::CREATED, Json(CartView::build(cart, Vec::new()))))
}

/// Get a cart with its lines and total.
///
/// # Errors
///
/// Returns an error if the cart does not exist or the query fails.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<CartId>) -> Result<Json<CartView>> {
    let cart = load_cart(&state, id).await?;
    let items = carts::list_items(state.pool(), id).await?;
    Ok(Json(CartView::build(cart, items)))
}

/// Delete a cart and all its lines.
///
/// # Errors
///
/// Returns an error if the cart does not exist or the delete fails.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<CartId>) -> Result<StatusCode> {
    carts::delete_cart(state.pool(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a cart's lines.
///
/// # Errors
///
/// Returns an error if the cart does not exist or the query fails.
#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<CartId>,
) -> Result<Json<Vec<CartItemView>>> {
    load_cart(&state, id).await?;

    let items = carts::list_items(state.pool(), id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Add a product to a cart. Adding a product already in the cart bumps
/// the existing line's quantity instead of creating a second line.
///
/// # Errors
///
/// Returns an error if the cart or product does not exist, the quantity
/// is not positive, or the insert fails.
#[instrument(skip(state, body))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<CartId>,
    Json(body): Json<AddItemBody>,
) -> Result<(StatusCode, Json<CartItemView>)> {
    validate_quantity(body.quantity)?;
    load_cart(&state, id).await?;

    let item = carts::upsert_item(state.pool(), id, body.product_id, body.quantity).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Replace a cart line's quantity.
///
/// # Errors
///
/// Returns an error if the line does not exist in this cart, the quantity
/// is not positive, or the update fails.
#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(CartId, CartItemId)>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<CartItemView>> {
    validate_quantity(body.quantity)?;

    let item = carts::set_item_quantity(state.pool(), id, item_id, body.quantity).await?;
    Ok(Json(item.into()))
}

/// Remove a line from a cart.
///
/// # Errors
///
/// Returns an error if the line does not exist in this cart or the
/// delete fails.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(CartId, CartItemId)>,
) -> Result<StatusCode> {
    carts::remove_item(state.pool(), id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
