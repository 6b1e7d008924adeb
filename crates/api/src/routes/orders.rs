//! Checkout, payment and order reads.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use maru_commerce::models::{BuyerDetails, Order, PaymentConfirmation};
use maru_core::{OrderId, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// POST /users/{user_id}/checkout
pub async fn checkout(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(buyer): Json<BuyerDetails>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.shop().orders.checkout(user_id, buyer).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /users/{user_id}/orders
pub async fn index(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.shop().orders.orders_for_user(user_id).await?))
}

/// GET /orders/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.shop().orders.get(id).await?))
}

/// POST /orders/{id}/payment
///
/// Called once the payment provider has confirmed the charge.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(payment): Json<PaymentConfirmation>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.shop().orders.confirm_payment(id, payment).await?))
}
