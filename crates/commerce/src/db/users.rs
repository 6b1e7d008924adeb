//! Account repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use maru_core::{Email, PhoneNumber, UserId};

use super::RepositoryError;
use crate::models::{NewUser, User, UserUpdate};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    phone: Option<String>,
    address1: String,
    address2: String,
    zipcode: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = row
            .phone
            .as_deref()
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            phone,
            address1: row.address1,
            address2: row.address2,
            zipcode: row.zipcode,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, name, phone, address1, address2, zipcode, is_admin, created_at, updated_at";

/// Repository for shop accounts.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO shop.app_user (email, name, phone, credential_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(user.phone.as_ref().map(PhoneNumber::as_str))
        .bind(&user.credential_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| super::unique_violation(e, "email"))?;

        row.try_into()
    }

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// All accounts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.app_user ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Replace profile fields and, if given, the credential hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        let profile = &update.profile;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE shop.app_user
            SET name = $2,
                is_admin = $3,
                phone = $4,
                address1 = $5,
                address2 = $6,
                zipcode = $7,
                credential_hash = COALESCE($8, credential_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&profile.name)
        .bind(profile.is_admin)
        .bind(profile.phone.as_ref().map(PhoneNumber::as_str))
        .bind(&profile.address1)
        .bind(&profile.address2)
        .bind(&profile.zipcode)
        .bind(update.credential_hash.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an account. Cart lines cascade; orders keep their snapshot
    /// with the buyer reference cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.app_user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
