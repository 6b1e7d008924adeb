//! Admin edits from the command line.
//!
//! # Environment Variables
//!
//! - `MARU_DATABASE_URL` - `PostgreSQL` connection string
//! - `MARU_NEW_CREDENTIAL` - replacement credential for `user update --reset-credential`

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::info;

use maru_commerce::models::{ProfileUpdate, User};
use maru_core::{OrderId, OrderStatus, PhoneNumber, ProductId, StockKey, UserId};

/// Errors specific to admin command input.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Phone number did not parse.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
}

/// Set an order's status and optionally its tracking number.
///
/// # Errors
///
/// Returns an error if the order does not exist or the database fails.
pub async fn set_order_status(
    order: OrderId,
    status: OrderStatus,
    tracking: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shop = super::connect().await?;
    let order = shop
        .orders
        .update_order_status(order, status, tracking)
        .await?;

    info!(
        "Order {} ({}) is now {}, tracking: {}",
        order.id,
        order.order_number,
        order.status,
        order
            .tracking_number
            .as_ref()
            .map_or("none", |t| t.as_str())
    );
    Ok(())
}

/// List accounts, newest first, with their order counts.
///
/// # Errors
///
/// Returns an error if the database fails.
pub async fn list_users() -> Result<(), Box<dyn std::error::Error>> {
    let shop = super::connect().await?;
    let users = shop.accounts.list_users().await?;

    info!("{} accounts", users.len());
    for entry in users {
        info!(
            "  {} {} <{}> admin={} orders={}",
            entry.user.id,
            entry.user.name,
            entry.user.email,
            entry.user.is_admin,
            entry.orders.len()
        );
    }
    Ok(())
}

/// Fields given on the command line; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ProfileEdits {
    pub name: Option<String>,
    pub is_admin: Option<bool>,
    /// `""` clears the phone number.
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub zipcode: Option<String>,
}

impl ProfileEdits {
    /// Overlay these edits on the user's current profile.
    fn apply_to(self, current: &User) -> Result<ProfileUpdate, AdminError> {
        let phone = match self.phone {
            None => current.phone.clone(),
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(PhoneNumber::parse(&raw).map_err(|_| AdminError::InvalidPhone(raw))?),
        };
        Ok(ProfileUpdate {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            is_admin: self.is_admin.unwrap_or(current.is_admin),
            phone,
            address1: self.address1.unwrap_or_else(|| current.address1.clone()),
            address2: self.address2.unwrap_or_else(|| current.address2.clone()),
            zipcode: self.zipcode.unwrap_or_else(|| current.zipcode.clone()),
        })
    }
}

/// Edit an account.
///
/// # Errors
///
/// Returns an error if the user does not exist, the new credential is
/// outside the length policy, or the name is blank.
pub async fn update_user(
    user: UserId,
    edits: ProfileEdits,
    reset_credential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let credential = if reset_credential {
        Some(
            std::env::var("MARU_NEW_CREDENTIAL")
                .map(SecretString::from)
                .map_err(|_| AdminError::MissingEnvVar("MARU_NEW_CREDENTIAL"))?,
        )
    } else {
        None
    };

    let shop = super::connect().await?;
    let current = shop.accounts.get_user(user).await?;
    let profile = edits.apply_to(&current)?;

    let updated = shop
        .accounts
        .update_user(
            user,
            profile,
            credential.as_ref().map(ExposeSecret::expose_secret),
        )
        .await?;

    info!(
        "User {} updated: {} <{}> admin={}",
        updated.id, updated.name, updated.email, updated.is_admin
    );
    if reset_credential {
        info!("Credential replaced");
    }
    Ok(())
}

/// Delete an account. Its orders are kept without an owner.
///
/// # Errors
///
/// Returns an error if the user does not exist.
pub async fn delete_user(user: UserId) -> Result<(), Box<dyn std::error::Error>> {
    let shop = super::connect().await?;
    shop.accounts.delete_user(user).await?;
    info!("User {user} deleted");
    Ok(())
}

/// Restock or write off one size.
///
/// # Errors
///
/// Returns an error if the size does not exist or the result would be negative.
pub async fn adjust_stock(
    product: ProductId,
    size: &str,
    delta: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let shop = super::connect().await?;
    let key = StockKey::new(product, size);
    let qty = shop.stock.adjust(&key, delta).await?;
    info!("Stock {key} is now {qty}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maru_core::Email;

    fn current() -> User {
        User {
            id: UserId::new(3),
            email: Email::parse("kim@example.com").unwrap(),
            name: "Kim".to_string(),
            phone: Some(PhoneNumber::parse("010-1234-5678").unwrap()),
            address1: "1 Main St".to_string(),
            address2: String::new(),
            zipcode: "04524".to_string(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_edits_keep_profile() {
        let user = current();
        let profile = ProfileEdits::default().apply_to(&user).unwrap();
        assert_eq!(profile.name, "Kim");
        assert_eq!(profile.phone, user.phone);
        assert_eq!(profile.zipcode, "04524");
        assert!(!profile.is_admin);
    }

    #[test]
    fn test_edits_override_fields() {
        let edits = ProfileEdits {
            is_admin: Some(true),
            phone: Some(String::new()),
            address2: Some("Apt 2".to_string()),
            ..ProfileEdits::default()
        };
        let profile = edits.apply_to(&current()).unwrap();
        assert!(profile.is_admin);
        assert_eq!(profile.phone, None);
        assert_eq!(profile.address2, "Apt 2");
        assert_eq!(profile.address1, "1 Main St");
    }

    #[test]
    fn test_bad_phone_is_rejected() {
        let edits = ProfileEdits {
            phone: Some("call me".to_string()),
            ..ProfileEdits::default()
        };
        assert!(matches!(
            edits.apply_to(&current()),
            Err(AdminError::InvalidPhone(_))
        ));
    }
}
