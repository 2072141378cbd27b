//! Database operations for the catalog (categories and products).
//!
//! Every product read joins its category so handlers never load the
//! relation lazily; category reads carry a product count for the same
//! reason.

use chrono::{DateTime, Utc};
use clementine_core::{CategoryId, ProductId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{DeleteOutcome, RepositoryError, fk_violation};

/// A catalog category with its current product count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Number of products currently filed under this category.
    pub product_count: i64,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating or updating a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
}

/// A catalog product with its category title.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug, derived from the name at creation.
    pub slug: String,
    /// Free-form description.
    pub description: String,
    /// Tax-exclusive base price.
    pub unit_price: Decimal,
    /// Units in stock.
    pub inventory: i32,
    /// Owning category.
    pub category_id: CategoryId,
    /// Title of the owning category.
    pub category_title: String,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// URL slug (derived from the name by the caller).
    pub slug: String,
    /// Free-form description.
    pub description: String,
    /// Tax-exclusive base price.
    pub unit_price: Decimal,
    /// Units in stock.
    pub inventory: i32,
    /// Owning category.
    pub category_id: CategoryId,
}

/// Parameters for updating a product. The slug is never touched.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Tax-exclusive base price.
    pub unit_price: Decimal,
    /// Units in stock.
    pub inventory: i32,
    /// Owning category.
    pub category_id: CategoryId,
}

const CATEGORY_COLUMNS: &str = r"
    c.id,
    c.title,
    c.description,
    (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id) AS product_count,
    c.created_at,
    c.updated_at
";

/// List all categories with their product counts.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, RepositoryError> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        r"
        SELECT {CATEGORY_COLUMNS}
        FROM categories c
        ORDER BY c.id
        "
    ))
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Get a category by ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_category(
    pool: &PgPool,
    category_id: CategoryId,
) -> Result<Option<Category>, RepositoryError> {
    let category = sqlx::query_as::<_, Category>(&format!(
        r"
        SELECT {CATEGORY_COLUMNS}
        FROM categories c
        WHERE c.id = $1
        "
    ))
    .bind(category_id)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

/// Create a new category.
///
/// # Errors
///
/// Returns error if the database insert fails.
pub async fn create_category(
    pool: &PgPool,
    input: CategoryInput,
) -> Result<Category, RepositoryError> {
    let category = sqlx::query_as::<_, Category>(
        r"
        INSERT INTO categories (title, description)
        VALUES ($1, $2)
        RETURNING id, title, description, 0::bigint AS product_count, created_at, updated_at
        ",
    )
    .bind(input.title)
    .bind(input.description)
    .fetch_one(pool)
    .await?;

    Ok(category)
}

/// Update a category's title and description.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the category does not exist,
/// or another error if the database update fails.
pub async fn update_category(
    pool: &PgPool,
    category_id: CategoryId,
    input: CategoryInput,
) -> Result<Category, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE categories
        SET title = $2, description = $3, updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(category_id)
    .bind(input.title)
    .bind(input.description)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    get_category(pool, category_id)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Delete a category unless products still reference it.
///
/// The reference check and the delete run in one transaction; the
/// `products.category_id` foreign key is the backstop for races.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the category does not exist,
/// or another error if the database operations fail.
pub async fn delete_category(
    pool: &PgPool,
    category_id: CategoryId,
) -> Result<DeleteOutcome, RepositoryError> {
    let mut tx = pool.begin().await?;

    let references = sqlx::query_scalar::<_, i64>(
        r"
        SELECT COUNT(*) FROM products WHERE category_id = $1
        ",
    )
    .bind(category_id)
    .fetch_one(&mut *tx)
    .await?;

    if references > 0 {
        return Ok(DeleteOutcome::Blocked { references });
    }

    let result = sqlx::query(r"DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    tx.commit().await?;
    Ok(DeleteOutcome::Deleted)
}

const PRODUCT_COLUMNS: &str = r"
    p.id,
    p.name,
    p.slug,
    p.description,
    p.unit_price,
    p.inventory,
    p.category_id,
    c.title AS category_title,
    p.created_at,
    p.updated_at
";

/// List all products with their category titles.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
    let products = sqlx::query_as::<_, Product>(&format!(
        r"
        SELECT {PRODUCT_COLUMNS}
        FROM products p
        JOIN categories c ON c.id = p.category_id
        ORDER BY p.id
        "
    ))
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// Get a product by ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_product(
    pool: &PgPool,
    product_id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        r"
        SELECT {PRODUCT_COLUMNS}
        FROM products p
        JOIN categories c ON c.id = p.category_id
        WHERE p.id = $1
        "
    ))
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

/// Create a new product.
///
/// # Errors
///
/// Returns [`RepositoryError::InvalidReference`] if the category does not
/// exist, or another error if the database insert fails.
pub async fn create_product(pool: &PgPool, input: NewProduct) -> Result<Product, RepositoryError> {
    let product_id = sqlx::query_scalar::<_, ProductId>(
        r"
        INSERT INTO products (name, slug, description, unit_price, inventory, category_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(input.name)
    .bind(input.slug)
    .bind(input.description)
    .bind(input.unit_price)
    .bind(input.inventory)
    .bind(input.category_id)
    .fetch_one(pool)
    .await
    .map_err(|e| fk_violation(e, "no category with this id"))?;

    get_product(pool, product_id)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Update a product. The slug keeps its creation-time value.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the product does not exist,
/// [`RepositoryError::InvalidReference`] if the new category does not
/// exist, or another error if the database update fails.
pub async fn update_product(
    pool: &PgPool,
    product_id: ProductId,
    input: UpdateProduct,
) -> Result<Product, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products
        SET name = $2, description = $3, unit_price = $4, inventory = $5,
            category_id = $6, updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(product_id)
    .bind(input.name)
    .bind(input.description)
    .bind(input.unit_price)
    .bind(input.inventory)
    .bind(input.category_id)
    .execute(pool)
    .await
    .map_err(|e| fk_violation(e, "no category with this id"))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    get_product(pool, product_id)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Delete a product unless order items still reference it.
///
/// Cart items referencing the product are removed by the cascade; order
/// items block the delete so past orders keep their lines.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the product does not exist,
/// or another error if the database operations fail.
pub async fn delete_product(
    pool: &PgPool,
    product_id: ProductId,
) -> Result<DeleteOutcome, RepositoryError> {
    let mut tx = pool.begin().await?;

    let references = sqlx::query_scalar::<_, i64>(
        r"
        SELECT COUNT(*) FROM order_items WHERE product_id = $1
        ",
    )
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;

    if references > 0 {
        return Ok(DeleteOutcome::Blocked { references });
    }

    let result = sqlx::query(r"DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    tx.commit().await?;
    Ok(DeleteOutcome::Deleted)
}
