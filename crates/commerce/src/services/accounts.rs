//! Account creation and admin account edits.
//!
//! Credentials are checked against the length policy before anything else
//! happens, then hashed with Argon2id. A rejected edit never reaches the
//! store.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use tracing::{info, instrument};

use maru_core::{Email, NewCredential, PhoneNumber, UserId};

use crate::error::{CommerceError, Result};
use crate::models::{NewUser, ProfileUpdate, User, UserUpdate, UserWithOrders};
use crate::store::Store;

/// Account operations.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// - `WeakCredential` if the credential is outside the length policy
    /// - `Validation` if the name is blank
    /// - `Conflict` if the email is already registered
    #[instrument(skip(self, name, phone, credential), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: Email,
        name: &str,
        phone: Option<PhoneNumber>,
        credential: &str,
    ) -> Result<User> {
        let credential = NewCredential::parse(credential)?;
        let name = required_name(name)?;

        let user = self
            .store
            .create_user(&NewUser {
                email,
                name,
                phone,
                credential_hash: hash_credential(&credential)?,
            })
            .await?;

        info!(user = %user.id, "account created");
        Ok(user)
    }

    /// Replace a user's profile fields and optionally their credential.
    ///
    /// An empty `new_credential` means "leave unchanged".
    ///
    /// # Errors
    ///
    /// - `WeakCredential` if a new credential is outside the length policy
    /// - `Validation` if the name is blank
    /// - `NotFound` if the user does not exist
    #[instrument(skip(self, profile, new_credential), fields(user = %user))]
    pub async fn update_user(
        &self,
        user: UserId,
        profile: ProfileUpdate,
        new_credential: Option<&str>,
    ) -> Result<User> {
        let credential = match new_credential {
            Some(raw) if !raw.is_empty() => Some(NewCredential::parse(raw)?),
            _ => None,
        };
        let profile = ProfileUpdate {
            name: required_name(&profile.name)?,
            ..profile
        };
        let credential_hash = credential.as_ref().map(hash_credential).transpose()?;
        let credential_changed = credential_hash.is_some();

        let updated = self
            .store
            .update_user(
                user,
                &UserUpdate {
                    profile,
                    credential_hash,
                },
            )
            .await
            .map_err(|e| CommerceError::from_repo(e, || format!("user {user}")))?;

        info!(
            is_admin = updated.is_admin,
            credential_changed, "account updated"
        );
        Ok(updated)
    }

    /// Delete an account. Its orders remain, detached from the account.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn delete_user(&self, user: UserId) -> Result<()> {
        if !self.store.delete_user(user).await? {
            return Err(CommerceError::NotFound(format!("user {user}")));
        }
        info!("account deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the user does not exist.
    pub async fn get_user(&self, user: UserId) -> Result<User> {
        self.store
            .get_user(user)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("user {user}")))
    }

    /// Every account with its orders, newest accounts first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if storage fails.
    pub async fn list_users(&self) -> Result<Vec<UserWithOrders>> {
        let users = self.store.list_users().await?;
        let mut listed = Vec::with_capacity(users.len());
        for user in users {
            let orders = self.store.orders_for_user(user.id).await?;
            listed.push(UserWithOrders { user, orders });
        }
        Ok(listed)
    }
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommerceError::validation("name", "must not be blank"));
    }
    Ok(name.to_owned())
}

fn hash_credential(credential: &NewCredential) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(credential.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CommerceError::CredentialHash)
}
