//! Admin edits and account sign-up.
//!
//! Callers of the `/admin` routes are assumed to be authorized by the
//! gateway in front of this service.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use maru_commerce::models::{Order, ProfileUpdate, User, UserWithOrders};
use maru_core::{Email, OrderId, OrderStatus, PhoneNumber, ProductId, StockKey, UserId};

use crate::error::AppError;
use crate::state::AppState;

// =============================================================================
// Orders
// =============================================================================

/// New status plus optional tracking number. `""` or `"-"` clears tracking.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// PUT /admin/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .shop()
        .orders
        .update_order_status(id, request.status, request.tracking_number.as_deref())
        .await?;
    Ok(Json(order))
}

// =============================================================================
// Users
// =============================================================================

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserWithOrders>>, AppError> {
    Ok(Json(state.shop().accounts.list_users().await?))
}

/// Admin account edit. Every profile field is replaced; an absent or empty
/// `new_credential` keeps the current one.
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(flatten)]
    pub profile: ProfileUpdate,
    #[serde(default)]
    pub new_credential: Option<String>,
}

/// PUT /admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = state
        .shop()
        .accounts
        .update_user(id, request.profile, request.new_credential.as_deref())
        .await?;
    Ok(Json(user))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    state.shop().accounts.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sign-up form.
#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
    pub credential: String,
}

/// POST /users
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state
        .shop()
        .accounts
        .sign_up(
            request.email,
            &request.name,
            request.phone,
            &request.credential,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// =============================================================================
// Stock
// =============================================================================

/// Restock (positive) or write-off (negative) for one product/size.
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub product_id: ProductId,
    pub size: String,
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct AdjustStockResponse {
    pub product_id: ProductId,
    pub size: String,
    pub qty: u32,
}

/// POST /admin/stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<AdjustStockResponse>, AppError> {
    let key = StockKey::new(request.product_id, request.size);
    let qty = state.shop().stock.adjust(&key, request.delta).await?;
    Ok(Json(AdjustStockResponse {
        product_id: key.product_id,
        size: key.size,
        qty,
    }))
}
