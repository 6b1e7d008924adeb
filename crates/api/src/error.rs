//! Unified error handling for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use maru_commerce::CommerceError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A commerce rule rejected the request, or storage failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// Malformed input the extractors let through.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Commerce(err) => match err {
                CommerceError::StockLookupFailed(_) | CommerceError::NotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CommerceError::SoldOut(_)
                | CommerceError::InsufficientStock { .. }
                | CommerceError::Conflict(_) => StatusCode::CONFLICT,
                CommerceError::InvalidDelta | CommerceError::EmptyCart => StatusCode::BAD_REQUEST,
                CommerceError::WeakCredential(_) | CommerceError::Validation { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CommerceError::CredentialHash | CommerceError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Stable machine-readable kind.
    const fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Commerce(err) => match err {
                CommerceError::StockLookupFailed(_) => "stock_lookup_failed",
                CommerceError::SoldOut(_) => "sold_out",
                CommerceError::InsufficientStock { .. } => "insufficient_stock",
                CommerceError::WeakCredential(_) => "weak_credential",
                CommerceError::NotFound(_) => "not_found",
                CommerceError::Conflict(_) => "conflict",
                CommerceError::InvalidDelta => "invalid_delta",
                CommerceError::EmptyCart => "empty_cart",
                CommerceError::Validation { .. } => "validation",
                CommerceError::CredentialHash | CommerceError::Repository(_) => "internal",
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: self.kind(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
