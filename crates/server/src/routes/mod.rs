//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Readiness check (DB ping)
//!
//! # Auth
//! POST   /api/auth/register      - Create an account and log it in
//! POST   /api/auth/login         - Login
//! POST   /api/auth/logout        - Logout
//! GET    /api/auth/me            - Current account
//!
//! # Catalog (reads open, writes admin-gated)
//! GET    /api/products           - Product listing (?category= filter)
//! GET    /api/products/{id}      - Product detail
//! POST   /api/products           - Create product (admin)
//! PUT    /api/products/{id}      - Update product (admin)
//! DELETE /api/products/{id}      - Delete product (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart               - Cart contents with live product data
//! POST   /api/cart/items         - Add item (merges on repeat products)
//! PATCH  /api/cart/items/{id}    - Set quantity (0 or below removes)
//! DELETE /api/cart/items/{id}    - Remove item
//! DELETE /api/cart               - Clear cart
//!
//! # Orders (requires auth)
//! POST   /api/orders             - Checkout the cart into an order
//! GET    /api/orders             - Order history
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::index).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", post(orders::create).get(orders::index))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
}
