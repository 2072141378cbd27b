//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use clementine_core::{CategoryId, ProductId, price_after_tax, slugify};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{DeleteOutcome, catalog};
use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Category summary embedded in product responses.
#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub title: String,
}

/// Product display data. `display_price` is the unit price with tax applied.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub display_price: Decimal,
    pub inventory: i32,
    pub category: CategoryRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<catalog::Product> for ProductView {
    fn from(product: catalog::Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            unit_price: product.unit_price,
            display_price: price_after_tax(product.unit_price),
            inventory: product.inventory,
            category: CategoryRef {
                id: product.category_id,
                title: product.category_title,
            },
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Product create/update body. Prices arrive as JSON strings.
#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    pub inventory: i32,
    pub category_id: CategoryId,
}

fn validate(body: &ProductBody) -> Result<()> {
    if body.name.chars().count() < 6 {
        return Err(AppError::Validation(
            "product name must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// List all products with their categories.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = catalog::list_products(state.pool()).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Get a product by ID.
///
/// # Errors
///
/// Returns an error if the product does not exist or the query fails.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = catalog::get_product(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("no product with this id".to_string()))?;
    Ok(Json(product.into()))
}

/// Create a product. The slug is derived from the name.
///
/// # Errors
///
/// Returns an error if validation fails, the category does not exist,
/// or the database insert fails.
#[instrument(skip(state, body))]
pub async fn create(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<ProductView>)> {
    validate(&body)?;

    let slug = slugify(&body.name);
    let product = catalog::create_product(
        state.pool(),
        catalog::NewProduct {
            name: body.name,
            slug,
            description: body.description,
            unit_price: body.unit_price,
            inventory: body.inventory,
            category_id: body.category_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Update a product. The slug keeps its original value.
///
/// # Errors
///
/// Returns an error if validation fails, the product or category does not
/// exist, or the database update fails.
#[instrument(skip(state, body))]
pub async fn update(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductBody>,
) -> Result<Json<ProductView>> {
    validate(&body)?;

    let product = catalog::update_product(
        state.pool(),
        id,
        catalog::UpdateProduct {
            name: body.name,
            description: body.description,
            unit_price: body.unit_price,
            inventory: body.inventory,
            category_id: body.category_id,
        },
    )
    .await?;

    Ok(Json(product.into()))
}

/// Delete a product, refusing while order lines still reference it.
///
/// # Errors
///
/// Returns an error if the product does not exist, appears in orders,
/// or the database delete fails.
#[instrument(skip(state))]
pub async fn remove(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    match catalog::delete_product(state.pool(), id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Blocked { references } => Err(AppError::DeletionBlocked(format!(
            "{references} order items include this product; remove them first"
        ))),
    }
}
