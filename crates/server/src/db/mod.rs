//! Persistence for the storefront.
//!
//! # Tables
//!
//! - `users` - Site authentication accounts
//! - `session` (schema `tower_sessions`) - Tower-sessions storage
//! - `products` - The catalog
//! - `cart_items` - One row per (user, product) pair, merged on add
//! - `orders` / `order_lines` - Immutable checkout records with snapshot prices
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p tannery-cli -- migrate
//! ```
//!
//! All access goes through the [`Store`] trait so the service layer can be
//! exercised against [`memory::MemStore`] in tests; [`postgres::PgStore`] is
//! the production implementation.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemStore;
pub use postgres::PgStore;

use tannery_core::{CartItemId, ProductCategory, ProductId, UserId, UserRole, Username};

use crate::models::{
    CartItem, CartLine, NewProduct, Order, OrderDraft, PlacedOrder, Product, ProductUpdate, User,
};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence interface for accounts, catalog, cart, and order state.
///
/// Every mutating operation executes as a single atomic unit against the
/// backing store; [`Store::create_order`] in particular spans the order
/// insert, its lines, and the cart delete in one transaction.
///
/// No implementation may cache rows across calls: cart and checkout
/// correctness depend on every read observing the latest committed state.
#[allow(async_fn_in_trait)]
pub trait Store: Send + Sync {
    // =========================================================================
    // Users
    // =========================================================================

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the username is taken.
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError>;

    /// Look up an account and its password hash by username.
    async fn user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, StoreError>;

    /// Look up an account by ID.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products, optionally restricted to one category.
    async fn products(
        &self,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, StoreError>;

    /// Look up a single product.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Insert a catalog entry.
    async fn insert_product(&self, input: &NewProduct) -> Result<Product, StoreError>;

    /// Apply a partial update; returns `None` if the product does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, StoreError>;

    /// Delete a catalog entry; returns `false` if it did not exist.
    ///
    /// Cart rows and order lines referencing the product are left in place:
    /// cart reads drop them, order lines keep their snapshot price.
    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add `quantity` units of a product to a user's cart.
    ///
    /// Keyed on the `(user_id, product_id)` uniqueness constraint: if a row
    /// already exists its quantity is incremented, otherwise a row is
    /// created. Two racing calls must never produce two rows for the pair.
    async fn upsert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, StoreError>;

    /// Set an item's quantity directly (not additive), scoped to its owner.
    ///
    /// Returns `None` if no item with that ID belongs to the user. Callers
    /// must have validated `quantity >= 1`.
    async fn set_cart_quantity(
        &self,
        item_id: CartItemId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<Option<CartItem>, StoreError>;

    /// Delete one cart item, scoped to its owner.
    ///
    /// Returns `false` if nothing was deleted; an absent item is not an
    /// error.
    async fn remove_cart_item(
        &self,
        item_id: CartItemId,
        user_id: UserId,
    ) -> Result<bool, StoreError>;

    /// A user's cart joined with live catalog rows, in insertion order.
    ///
    /// Rows whose product no longer exists are excluded.
    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError>;

    /// Delete all of a user's cart rows; returns how many were removed.
    async fn clear_cart(&self, user_id: UserId) -> Result<u64, StoreError>;

    // =========================================================================
    // Orders
    // =========================================================================

    /// Persist an order atomically.
    ///
    /// In one transaction: delete the user's cart rows, insert the order,
    /// insert one line per draft line. If the user has no cart rows at
    /// commit time (e.g., a concurrent checkout got there first) the whole
    /// transaction is rolled back and [`StoreError::NotFound`] is returned;
    /// nothing is persisted on any failure.
    async fn create_order(&self, draft: &OrderDraft) -> Result<PlacedOrder, StoreError>;

    /// All orders placed by a user, in creation order.
    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
