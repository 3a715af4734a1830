//! Order route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::services::OrderService;
use crate::state::AppState;

/// Checkout: convert the cart into an order.
///
/// Returns 201 with the created order and its lines; the cart is empty
/// afterwards. Fails with 400 if the cart has no items.
#[instrument(skip(state))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.store());
    let placed = orders.checkout(user.id).await?;

    Ok((StatusCode::CREATED, Json(placed)))
}

/// Order history, oldest first.
#[instrument(skip(state))]
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store());
    let list = orders.list(user.id).await?;

    Ok(Json(list))
}
