//! Product comment route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use clementine_core::{CommentId, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{catalog, comments};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Comment display data.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub product_id: ProductId,
    pub name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<comments::Comment> for CommentView {
    fn from(comment: comments::Comment) -> Self {
        Self {
            id: comment.id,
            product_id: comment.product_id,
            name: comment.name,
            body: comment.body,
            created_at: comment.created_at,
        }
    }
}

/// Comment create body.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub name: String,
    pub body: String,
}

async fn ensure_product(state: &AppState, product_id: ProductId) -> Result<()> {
    catalog::get_product(state.pool(), product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("no product with this id".to_string()))?;
    Ok(())
}

/// List a product's comments, oldest first.
///
/// # Errors
///
/// Returns an error if the product does not exist or the query fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<CommentView>>> {
    ensure_product(&state, product_id).await?;

    let comments = comments::list_for_product(state.pool(), product_id).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Post a comment on a product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the insert fails.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<CommentView>)> {
    ensure_product(&state, product_id).await?;

    let comment = comments::create(
        state.pool(),
        product_id,
        comments::NewComment {
            name: body.name,
            body: body.body,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}
