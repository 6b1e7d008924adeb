//! Catalog reads.

use axum::{
    Json,
    extract::{Path, State},
};

use maru_commerce::models::Product;
use maru_core::ProductId;

use crate::error::AppError;
use crate::state::AppState;

/// GET /products
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.shop().catalog.list().await?))
}

/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.shop().catalog.get(id).await?))
}
