//! Order status.
//!
//! The nominal progression is
//! `Confirming -> Preparing -> Shipped -> ReturnRequested -> ReturnCompleted`,
//! but transitions are admin-driven and unconstrained: any status may be set
//! from any other. [`OrderStatus::transition`] reports when a move goes
//! backwards so callers can log it; it never refuses one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fulfilment status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order received, payment or stock being confirmed.
    #[default]
    Confirming,
    /// Being packed.
    Preparing,
    /// Handed to the carrier.
    Shipped,
    /// Buyer asked to return the order.
    ReturnRequested,
    /// Return received and closed.
    ReturnCompleted,
}

impl OrderStatus {
    pub const ALL: [Self; 5] = [
        Self::Confirming,
        Self::Preparing,
        Self::Shipped,
        Self::ReturnRequested,
        Self::ReturnCompleted,
    ];

    /// Position in the nominal progression.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Confirming => 0,
            Self::Preparing => 1,
            Self::Shipped => 2,
            Self::ReturnRequested => 3,
            Self::ReturnCompleted => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirming => "confirming",
            Self::Preparing => "preparing",
            Self::Shipped => "shipped",
            Self::ReturnRequested => "return_requested",
            Self::ReturnCompleted => "return_completed",
        }
    }

    /// Move to `to`. Always succeeds.
    #[must_use]
    pub const fn transition(self, to: Self) -> Transition {
        Transition { from: self, to }
    }
}

/// A status change applied by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl Transition {
    /// True when the new status is earlier in the progression than the old one.
    #[must_use]
    pub const fn is_backwards(&self) -> bool {
        self.to.rank() < self.from.rank()
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, Error)]
#[error("invalid order status: {0}")]
pub struct ParseStatusError(String);

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}
