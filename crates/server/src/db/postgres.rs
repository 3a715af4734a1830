//! `PostgreSQL`-backed [`Store`] implementation.
//!
//! Queries are runtime-checked `query_as` calls mapped onto `FromRow`
//! structs; row-to-domain conversion happens in `TryFrom` impls so invalid
//! stored text (a bad role or category) surfaces as
//! [`StoreError::DataCorruption`] instead of a panic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tannery_core::{
    CartItemId, OrderId, OrderLineId, ProductCategory, ProductId, UserId, UserRole, Username,
};

use super::{Store, StoreError};
use crate::models::{
    CartItem, CartLine, NewProduct, Order, OrderDraft, OrderLine, PlacedOrder, Product,
    ProductUpdate, User,
};

/// `PostgreSQL` store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool (for session storage and health checks).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<(User, String), StoreError> {
        let username = Username::parse(&self.username).map_err(|e| {
            StoreError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(|e| StoreError::DataCorruption(format!("invalid role in database: {e}")))?;

        Ok((
            User {
                id: UserId::new(self.id),
                username,
                role,
                created_at: self.created_at,
            },
            self.password_hash,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    category: String,
    price: Decimal,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = row.category.parse::<ProductCategory>().map_err(|e| {
            StoreError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            category,
            price: row.price,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

/// Cart row joined with its product, aliased `product_*` in the query.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
    product_name: String,
    product_description: String,
    product_category: String,
    product_price: Decimal,
    product_image_url: String,
    product_created_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = StoreError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let category = row.product_category.parse::<ProductCategory>().map_err(|e| {
            StoreError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        Ok(Self {
            item: CartItem {
                id: CartItemId::new(row.id),
                user_id: UserId::new(row.user_id),
                product_id: ProductId::new(row.product_id),
                quantity: row.quantity,
                created_at: row.created_at,
            },
            product: Product {
                id: ProductId::new(row.product_id),
                name: row.product_name,
                description: row.product_description,
                category,
                price: row.product_price,
                image_url: row.product_image_url,
                created_at: row.product_created_at,
            },
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("invalid status in database: {e}")))?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total: row.total,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderLineId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            price: row.price,
        }
    }
}

// =============================================================================
// Store Implementation
// =============================================================================

impl Store for PgStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .bind(role.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("username already exists".to_owned());
            }
            StoreError::Database(e)
        })?;

        let (user, _) = row.into_domain()?;
        Ok(user)
    }

    async fn user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_domain().map(|(user, _)| user)).transpose()
    }

    async fn products(
        &self,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> = match category {
            Some(category) => {
                sqlx::query_as(
                    r"
                    SELECT id, name, description, category, price, image_url, created_at
                    FROM products
                    WHERE category = $1
                    ORDER BY id
                    ",
                )
                .bind(category.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r"
                    SELECT id, name, description, category, price, image_url, created_at
                    FROM products
                    ORDER BY id
                    ",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, description, category, price, image_url, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn insert_product(&self, input: &NewProduct) -> Result<Product, StoreError> {
        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO products (name, description, category, price, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, category, price, image_url, created_at
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(input.price)
        .bind(&input.image_url)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                price = COALESCE($5, price),
                image_url = COALESCE($6, image_url)
            WHERE id = $1
            RETURNING id, name, description, category, price, image_url, created_at
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.category.map(|c| c.as_str()))
        .bind(update.price)
        .bind(update.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, StoreError> {
        // Merge keyed on the (user_id, product_id) uniqueness constraint so
        // concurrent adds cannot create duplicate rows.
        let row: CartItemRow = sqlx::query_as(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            RETURNING id, user_id, product_id, quantity, created_at
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn set_cart_quantity(
        &self,
        item_id: CartItemId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<Option<CartItem>, StoreError> {
        let row: Option<CartItemRow> = sqlx::query_as(
            r"
            UPDATE cart_items
            SET quantity = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, product_id, quantity, created_at
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CartItem::from))
    }

    async fn remove_cart_item(
        &self,
        item_id: CartItemId,
        user_id: UserId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        // Inner join: rows whose product was deleted are dropped here rather
        // than breaking the read path.
        let rows: Vec<CartLineRow> = sqlx::query_as(
            r"
            SELECT ci.id, ci.user_id, ci.product_id, ci.quantity, ci.created_at,
                   p.name AS product_name,
                   p.description AS product_description,
                   p.category AS product_category,
                   p.price AS product_price,
                   p.image_url AS product_image_url,
                   p.created_at AS product_created_at
            FROM cart_items ci
            INNER JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.created_at, ci.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<PlacedOrder, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Empty the cart first: zero rows means the cart was emptied since
        // the caller read it (e.g., a concurrent checkout), so abort before
        // minting an order.
        let deleted = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(draft.user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound);
        }

        let order_row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO orders (user_id, total, status)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, total, status, created_at
            ",
        )
        .bind(draft.user_id)
        .bind(draft.total)
        .bind(draft.status.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let line_row: OrderLineRow = sqlx::query_as(
                r"
                INSERT INTO order_lines (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_id, quantity, price
                ",
            )
            .bind(order_row.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *tx)
            .await?;

            lines.push(OrderLine::from(line_row));
        }

        tx.commit().await?;

        Ok(PlacedOrder {
            order: order_row.try_into()?,
            lines,
        })
    }

    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, total, status, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
