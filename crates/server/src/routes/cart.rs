//! Cart route handlers.
//!
//! All cart operations require an authenticated identity; the identity from
//! the gate is passed explicitly into the cart service.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use tannery_core::{CartItemId, ProductId};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{CartItem, CartLine};
use crate::services::CartService;
use crate::state::AppState;

/// Request body for adding an item.
#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Request body for setting an item's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityBody {
    pub quantity: i32,
}

/// Cart contents with live product data.
#[instrument(skip(state))]
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartLine>>> {
    let cart = CartService::new(state.store());
    let lines = cart.items(user.id).await?;

    Ok(Json(lines))
}

/// Add a product to the cart, merging with any existing row.
#[instrument(skip(state))]
pub async fn add(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddItemBody>,
) -> Result<Json<CartItem>> {
    let cart = CartService::new(state.store());
    let item = cart.add_item(user.id, body.product_id, body.quantity).await?;

    Ok(Json(item))
}

/// Set an item's quantity. Zero or below removes the item, in which case
/// the response body is `null`.
#[instrument(skip(state))]
pub async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateQuantityBody>,
) -> Result<Json<Option<CartItem>>> {
    let cart = CartService::new(state.store());
    let item = cart
        .update_quantity(user.id, CartItemId::new(id), body.quantity)
        .await?;

    Ok(Json(item))
}

/// Remove an item from the cart. Idempotent.
#[instrument(skip(state))]
pub async fn remove(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let cart = CartService::new(state.store());
    cart.remove_item(user.id, CartItemId::new(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove everything from the cart.
#[instrument(skip(state))]
pub async fn clear(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let cart = CartService::new(state.store());
    cart.clear(user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
