//! HTTP route handlers for the store API.
//!
//! # Route Structure
//!
//! Access levels: public, user (`x-user-id` header), staff (`x-user-id`
//! plus `x-user-staff`).
//!
//! ```text
//! # Categories
//! GET    /categories                  - List categories (public)
//! POST   /categories                  - Create category (staff)
//! GET    /categories/{id}             - Category detail (public)
//! PUT    /categories/{id}             - Update category (staff)
//! DELETE /categories/{id}             - Delete category (staff; refused while products reference it)
//!
//! # Products
//! GET    /products                    - List products (public)
//! POST   /products                    - Create product (staff)
//! GET    /products/{id}               - Product detail (public)
//! PUT    /products/{id}               - Update product (staff)
//! DELETE /products/{id}               - Delete product (staff; refused while order items reference it)
//! GET    /products/{id}/comments      - List product comments (public)
//! POST   /products/{id}/comments      - Create product comment (public)
//!
//! # Carts
//! POST   /carts                       - Open a new cart (public)
//! GET    /carts/{id}                  - Cart with items and totals (public)
//! DELETE /carts/{id}                  - Abandon cart (public)
//! GET    /carts/{id}/items            - List cart items (public)
//! POST   /carts/{id}/items            - Add a product; duplicate adds merge (public)
//! PATCH  /carts/{id}/items/{item_id}  - Set line quantity (public)
//! DELETE /carts/{id}/items/{item_id}  - Remove a line (public)
//!
//! # Customers
//! GET    /customers                   - List customer profiles (staff)
//! GET    /customers/me                - Own profile, created on first touch (user)
//! PUT    /customers/me                - Update own profile (user)
//!
//! # Orders
//! GET    /orders                      - Staff: all orders; customers: own orders (user)
//! POST   /orders                      - Convert a cart into an order (user)
//! GET    /orders/verify               - Payment gateway callback (public)
//! GET    /orders/{id}                 - Order detail, own orders only for non-staff (user)
//! PATCH  /orders/{id}                 - Set order status (staff)
//! DELETE /orders/{id}                 - Delete order (staff; refused while items exist)
//! GET    /orders/{id}/items           - The order's frozen line items (user)
//! POST   /orders/{id}/pay             - Start payment, redirect to the gateway (user)
//! ```

pub mod carts;
pub mod categories;
pub mod comments;
pub mod customers;
pub mod orders;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};
use rust_decimal::Decimal;

use crate::state::AppState;

/// Normalize a money amount to two decimal places for display.
pub(crate) fn money_scale(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(2);
    value
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/{id}/comments",
            get(comments::list).post(comments::create),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(carts::create))
        .route("/{id}", get(carts::show).delete(carts::remove))
        .route(
            "/{id}/items",
            get(carts::list_items).post(carts::add_item),
        )
        .route(
            "/{id}/items/{item_id}",
            patch(carts::update_item).delete(carts::remove_item),
        )
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list))
        .route("/me", get(customers::me).put(customers::update_me))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        // Static segment, kept ahead of the {id} captures
        .route("/verify", get(payments::verify))
        .route(
            "/{id}",
            get(orders::show)
                .patch(orders::update)
                .delete(orders::remove),
        )
        .route("/{id}/items", get(orders::list_items))
        .route("/{id}/pay", post(payments::pay))
}

/// Create all routes for the store API.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        // Shopping
        .nest("/carts", cart_routes())
        // Customers and orders
        .nest("/customers", customer_routes())
        .nest("/orders", order_routes())
}
