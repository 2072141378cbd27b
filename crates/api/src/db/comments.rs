//! Database operations for product comments.

use chrono::{DateTime, Utc};
use clementine_core::{CommentId, ProductId};
use sqlx::PgPool;

use super::{RepositoryError, fk_violation};

/// A comment left on a product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    /// Comment ID.
    pub id: CommentId,
    /// Product the comment belongs to.
    pub product_id: ProductId,
    /// Display name given by the commenter.
    pub name: String,
    /// Comment text.
    pub body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Display name given by the commenter.
    pub name: String,
    /// Comment text.
    pub body: String,
}

/// List comments for a product, oldest first.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_for_product(
    pool: &PgPool,
    product_id: ProductId,
) -> Result<Vec<Comment>, RepositoryError> {
    let comments = sqlx::query_as::<_, Comment>(
        r"
        SELECT id, product_id, name, body, created_at
        FROM comments
        WHERE product_id = $1
        ORDER BY id
        ",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

/// Create a comment on a product.
///
/// # Errors
///
/// Returns [`RepositoryError::InvalidReference`] if the product does not
/// exist, or another error if the database insert fails.
pub async fn create(
    pool: &PgPool,
    product_id: ProductId,
    input: NewComment,
) -> Result<Comment, RepositoryError> {
    let comment = sqlx::query_as::<_, Comment>(
        r"
        INSERT INTO comments (product_id, name, body)
        VALUES ($1, $2, $3)
        RETURNING id, product_id, name, body, created_at
        ",
    )
    .bind(product_id)
    .bind(input.name)
    .bind(input.body)
    .fetch_one(pool)
    .await
    .map_err(|e| fk_violation(e, "no product with this id"))?;

    Ok(comment)
}
