//! Cart line repository.
//!
//! Writes are conditional on both the line quantity the caller read and the
//! stock counter it validated against, so two processes racing on the same
//! line cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use maru_core::{ProductId, StockKey, UserId};

use super::{RepositoryError, qty_from_db, qty_to_db};
use crate::models::{CartLine, CartLineWrite};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: ProductId,
    size: String,
    qty: i32,
    added_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            size: row.size,
            qty: qty_from_db(row.qty)?,
            added_at: row.added_at,
        })
    }
}

/// Repository for cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lines in a user's cart, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT product_id, size, qty, added_at
            FROM shop.cart_line
            WHERE user_id = $1
            ORDER BY added_at, product_id, size
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// One line, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user: UserId,
        key: &StockKey,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT product_id, size, qty, added_at
            FROM shop.cart_line
            WHERE user_id = $1 AND product_id = $2 AND size = $3
            ",
        )
        .bind(user)
        .bind(key.product_id)
        .bind(&key.size)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Apply a conditional write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the line or the stock counter
    /// changed since the caller read them.
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn write(&self, user: UserId, write: &CartLineWrite) -> Result<(), RepositoryError> {
        let new_qty = qty_to_db(write.new_qty)?;
        let stock_seen = qty_to_db(write.stock_seen)?;

        let result = match write.expected_qty {
            Some(expected) => {
                sqlx::query(
                    r"
                    UPDATE shop.cart_line SET qty = $5
                    WHERE user_id = $1 AND product_id = $2 AND size = $3 AND qty = $4
                      AND EXISTS (
                          SELECT 1 FROM shop.stock
                          WHERE product_id = $2 AND size = $3 AND qty = $6
                      )
                    ",
                )
                .bind(user)
                .bind(write.key.product_id)
                .bind(&write.key.size)
                .bind(qty_to_db(expected)?)
                .bind(new_qty)
                .bind(stock_seen)
                .execute(self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    INSERT INTO shop.cart_line (user_id, product_id, size, qty)
                    SELECT $1, $2, $3, $4
                    WHERE EXISTS (
                        SELECT 1 FROM shop.stock
                        WHERE product_id = $2 AND size = $3 AND qty = $5
                    )
                    ON CONFLICT (user_id, product_id, size) DO NOTHING
                    ",
                )
                .bind(user)
                .bind(write.key.product_id)
                .bind(&write.key.size)
                .bind(new_qty)
                .bind(stock_seen)
                .execute(self.pool)
                .await
            }
        }
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "cart line {} changed",
                write.key
            )));
        }
        Ok(())
    }

    /// Remove a line. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user: UserId, key: &StockKey) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM shop.cart_line WHERE user_id = $1 AND product_id = $2 AND size = $3",
        )
        .bind(user)
        .bind(key.product_id)
        .bind(&key.size)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
