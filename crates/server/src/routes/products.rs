//! Catalog route handlers.
//!
//! Reads are open to everyone; create/update/delete pass through the
//! [`RequireAdmin`] gate before touching the store.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use tannery_core::{ProductCategory, ProductId};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<ProductCategory>,
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductBody {
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: Decimal,
    pub image_url: String,
}

/// Request body for updating a product. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
}

/// List products, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.store().products(query.category).await?;
    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = state
        .store()
        .product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(product))
}

/// Create a product (admin only).
#[instrument(skip(state, body))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateProductBody>,
) -> Result<impl IntoResponse> {
    let input = NewProduct {
        name: body.name,
        description: body.description,
        category: body.category,
        price: body.price,
        image_url: body.image_url,
    };
    validate_product_fields(&input.name, input.price)?;

    let product = state.store().insert_product(&input).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin only).
#[instrument(skip(state, body))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProductBody>,
) -> Result<Json<Product>> {
    if let Some(name) = &body.name
        && name.trim().is_empty()
    {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    if let Some(price) = body.price {
        validate_price(price)?;
    }

    let update = ProductUpdate {
        name: body.name,
        description: body.description,
        category: body.category,
        price: body.price,
        image_url: body.image_url,
    };

    let product = state
        .store()
        .update_product(ProductId::new(id), &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(product))
}

/// Delete a product (admin only).
///
/// Existing order lines keep their snapshot prices; cart rows referencing
/// the product simply stop appearing in cart reads.
#[instrument(skip(state))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = state.store().delete_product(ProductId::new(id)).await?;
    if !deleted {
        return Err(AppError::NotFound("Product".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn validate_product_fields(name: &str, price: Decimal) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    validate_price(price)
}

fn validate_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Price must not be negative".to_string(),
        ));
    }
    Ok(())
}
