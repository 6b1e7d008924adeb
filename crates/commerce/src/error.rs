//! Error taxonomy for commerce operations.
//!
//! Every variant is local to one operation: a failed call leaves state as it
//! was, and the caller recovers by issuing a corrected request. Nothing here
//! retries on its own.

use maru_core::{CredentialError, StockKey};
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors returned by the commerce services.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// The product or size referenced by a cart line no longer exists.
    #[error("stock lookup failed for {0}")]
    StockLookupFailed(StockKey),

    /// Nothing left of this size.
    #[error("{0} is sold out")]
    SoldOut(StockKey),

    /// The request asks for more units than are available.
    #[error("insufficient stock for {key}: requested {requested}, available {available}")]
    InsufficientStock {
        key: StockKey,
        requested: u32,
        available: u32,
    },

    /// New credential rejected by the length policy.
    #[error("weak credential: {0}")]
    WeakCredential(#[from] CredentialError),

    /// Referenced user, order or product is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent write won the race; re-read and retry once.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A quantity change of zero was requested.
    #[error("quantity change must be non-zero")]
    InvalidDelta,

    /// Checkout was requested with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Input failed a field-level check.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The credential could not be hashed.
    #[error("credential hashing failed")]
    CredentialHash,

    /// Storage failed in a way the caller cannot fix.
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl CommerceError {
    /// Convert a repository error, naming the missing record on `NotFound`.
    pub(crate) fn from_repo(err: RepositoryError, what: impl FnOnce() -> String) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(what()),
            other => other.into(),
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl ToString) -> Self {
        Self::Validation {
            field,
            reason: reason.to_string(),
        }
    }
}

impl From<RepositoryError> for CommerceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(reason) => Self::Conflict(reason),
            RepositoryError::OutOfStock {
                key,
                requested,
                available,
            } => Self::InsufficientStock {
                key,
                requested,
                available,
            },
            RepositoryError::StockMissing(key) => Self::StockLookupFailed(key),
            RepositoryError::NotFound => Self::NotFound("record".to_owned()),
            other => Self::Repository(other),
        }
    }
}

/// Result type alias for `CommerceError`.
pub type Result<T> = std::result::Result<T, CommerceError>;
