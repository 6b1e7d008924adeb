//! Cart endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use maru_commerce::models::{CartChange, CartTotals, CartView};
use maru_core::{ProductId, StockKey, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// Totals rendered with the shop's currency symbol.
#[derive(Debug, Serialize)]
pub struct DisplayTotals {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl DisplayTotals {
    fn render(totals: &CartTotals, symbol: &str) -> Self {
        Self {
            subtotal: totals.subtotal.display_with(symbol),
            shipping: totals.shipping.display_with(symbol),
            total: totals.total.display_with(symbol),
        }
    }
}

/// Cart page payload.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: CartView,
    pub display: Option<DisplayTotals>,
}

/// GET /users/{user_id}/cart
pub async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state.shop().carts.view(user_id).await?;
    let display = cart
        .totals
        .as_ref()
        .map(|t| DisplayTotals::render(t, state.currency_symbol()));
    Ok(Json(CartResponse { cart, display }))
}

/// Quantity change for one product/size.
#[derive(Debug, Deserialize)]
pub struct DeltaRequest {
    pub product_id: ProductId,
    pub size: String,
    pub delta: i64,
}

/// POST /users/{user_id}/cart/lines
pub async fn apply_delta(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<DeltaRequest>,
) -> Result<Json<CartChange>, AppError> {
    if request.size.trim().is_empty() {
        return Err(AppError::BadRequest("size must not be blank".to_string()));
    }
    let key = StockKey::new(request.product_id, request.size);
    let change = state
        .shop()
        .carts
        .apply_delta(user_id, &key, request.delta)
        .await?;
    Ok(Json(change))
}

/// DELETE /users/{user_id}/cart/lines/{product_id}/{size}
pub async fn remove_line(
    State(state): State<AppState>,
    Path((user_id, product_id, size)): Path<(UserId, ProductId, String)>,
) -> Result<StatusCode, AppError> {
    let key = StockKey::new(product_id, size);
    state.shop().carts.remove_line(user_id, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}
