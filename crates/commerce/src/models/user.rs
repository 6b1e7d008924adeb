//! Shop accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maru_core::{Email, PhoneNumber, UserId};

use super::order::Order;

/// A shop account.
///
/// The credential hash is write-only and never loaded into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: Option<PhoneNumber>,
    pub address1: String,
    pub address2: String,
    pub zipcode: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub phone: Option<PhoneNumber>,
    pub credential_hash: String,
}

/// Profile fields an administrator can edit. All fields are replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub is_admin: bool,
    pub phone: Option<PhoneNumber>,
    pub address1: String,
    pub address2: String,
    pub zipcode: String,
}

/// A validated account update as handed to storage.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub profile: ProfileUpdate,
    /// Replacement credential hash, if the credential is being changed.
    pub credential_hash: Option<String>,
}

/// An account with its orders, as listed in the admin console.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithOrders {
    #[serde(flatten)]
    pub user: User,
    pub orders: Vec<Order>,
}
