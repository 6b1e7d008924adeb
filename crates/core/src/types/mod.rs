//! Core types for Maru.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod credential;
pub mod id;
pub mod money;
pub mod status;
pub mod stock;
pub mod tracking;

pub use contact::{Email, EmailError, PhoneError, PhoneNumber};
pub use credential::{CredentialError, NewCredential};
pub use id::*;
pub use money::Money;
pub use status::{OrderStatus, ParseStatusError, Transition};
pub use stock::{Stock, StockKey};
pub use tracking::{BlankTrackingNumber, TrackingNumber};
