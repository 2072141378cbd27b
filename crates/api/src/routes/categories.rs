//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use clementine_core::CategoryId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{DeleteOutcome, catalog};
use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Category display data.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<catalog::Category> for CategoryView {
    fn from(category: catalog::Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            description: category.description,
            product_count: category.product_count,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Category create/update body.
#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

fn validate(body: &CategoryBody) -> Result<()> {
    if body.title.chars().count() < 3 {
        return Err(AppError::Validation(
            "category title must be at least 3 characters".to_string(),
        ));
    }
    Ok(())
}

/// List all categories with their product counts.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>> {
    let categories = catalog::list_categories(state.pool()).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Get a category by ID.
///
/// # Errors
///
/// Returns an error if the category does not exist or the query fails.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryView>> {
    let category = catalog::get_category(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("no category with this id".to_string()))?;
    Ok(Json(category.into()))
}

/// Create a category.
///
/// # Errors
///
/// Returns an error if validation or the database insert fails.
#[instrument(skip(state, body))]
pub async fn create(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CategoryBody>,
) -> Result<(StatusCode, Json<CategoryView>)> {
    validate(&body)?;

    let category = catalog::create_category(
        state.pool(),
        catalog::CategoryInput {
            title: body.title,
            description: body.description,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// Update a category's title and description.
///
/// # Errors
///
/// Returns an error if validation fails, the category does not exist,
/// or the database update fails.
#[instrument(skip(state, body))]
pub async fn update(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<CategoryView>> {
    validate(&body)?;

    let category = catalog::update_category(
        state.pool(),
        id,
        catalog::CategoryInput {
            title: body.title,
            description: body.description,
        },
    )
    .await?;

    Ok(Json(category.into()))
}

/// Delete a category, refusing while products still reference it.
///
/// # Errors
///
/// Returns an error if the category does not exist, still has products,
/// or the database delete fails.
#[instrument(skip(state))]
pub async fn remove(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    match catalog::delete_category(state.pool(), id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Blocked { references } => Err(AppError::DeletionBlocked(format!(
            "{references} products fall under this category; remove them first"
        ))),
    }
}
