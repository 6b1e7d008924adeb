//! Order repository.
//!
//! Lines are stored as JSONB alongside the header. A trigger in the
//! migration rejects any update that touches lines, amounts or the order
//! number, so only status, tracking and settlement columns ever change.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use maru_core::{
    Email, Money, OrderId, OrderStatus, PhoneNumber, StockKey, TrackingNumber, UserId,
};

use super::{RepositoryError, qty_from_db, qty_to_db};
use crate::models::{
    BuyerDetails, NewOrder, Order, OrderLine, PaymentConfirmation, Settlement,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    order_name: String,
    user_id: Option<UserId>,
    buyer_name: String,
    buyer_email: String,
    buyer_phone: String,
    address1: String,
    address2: String,
    zipcode: String,
    lines: Json<Vec<OrderLine>>,
    subtotal: Money,
    shipping: Money,
    amount: Money,
    status: OrderStatus,
    tracking_number: Option<String>,
    payment_key: Option<String>,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
    succeeded_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.buyer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid buyer email in database: {e}"))
        })?;
        let phone = PhoneNumber::parse(&row.buyer_phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid buyer phone in database: {e}"))
        })?;

        let settlement = match (row.payment_key, row.payment_method, row.succeeded_at) {
            (Some(payment_key), Some(method), Some(succeeded_at)) => Some(Settlement {
                payment_key,
                method,
                succeeded_at,
            }),
            (None, None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "partial settlement on order {}",
                    row.order_number
                )));
            }
        };

        Ok(Self {
            id: row.id,
            order_number: row.order_number,
            order_name: row.order_name,
            user_id: row.user_id,
            buyer: BuyerDetails {
                name: row.buyer_name,
                email,
                phone,
                address1: row.address1,
                address2: row.address2,
                zipcode: row.zipcode,
            },
            lines: row.lines.0,
            subtotal: row.subtotal,
            shipping: row.shipping,
            amount: row.amount,
            status: row.status,
            tracking_number: row.tracking_number.as_deref().and_then(TrackingNumber::parse),
            settlement,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusUpdateRow {
    previous_status: OrderStatus,
    #[sqlx(flatten)]
    order: OrderRow,
}

const ORDER_COLUMNS: &str = "o.id, o.order_number, o.order_name, o.user_id, o.buyer_name, \
     o.buyer_email, o.buyer_phone, o.address1, o.address2, o.zipcode, o.lines, o.subtotal, \
     o.shipping, o.amount, o.status, o.tracking_number, o.payment_key, o.payment_method, \
     o.created_at, o.succeeded_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for orders and settlement.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order snapshot in status `confirming`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    /// Returns `RepositoryError::NotFound` if the buyer account is gone.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO shop.customer_order AS o (
                order_number, order_name, user_id, buyer_name, buyer_email, buyer_phone,
                address1, address2, zipcode, lines, subtotal, shipping, amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(&order.order_number)
        .bind(&order.order_name)
        .bind(order.user_id)
        .bind(&order.buyer.name)
        .bind(order.buyer.email.as_str())
        .bind(order.buyer.phone.as_str())
        .bind(&order.buyer.address1)
        .bind(&order.buyer.address2)
        .bind(&order.buyer.zipcode)
        .bind(Json(&order.lines))
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.amount)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            super::unique_violation(e, "order number")
        })?;

        row.try_into()
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored snapshot is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored snapshot is invalid.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM shop.customer_order o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC
            "
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Overwrite status and tracking number, returning the previous status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_number: Option<&TrackingNumber>,
    ) -> Result<(OrderStatus, Order), RepositoryError> {
        let row = sqlx::query_as::<_, StatusUpdateRow>(&format!(
            r"
            WITH prev AS (
                SELECT id, status FROM shop.customer_order WHERE id = $1 FOR UPDATE
            )
            UPDATE shop.customer_order o
            SET status = $2, tracking_number = $3
            FROM prev
            WHERE o.id = prev.id
            RETURNING prev.status AS previous_status, {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(tracking_number.map(TrackingNumber::as_str))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok((row.previous_status, row.order.try_into()?))
    }

    /// Record payment and take stock in one transaction.
    ///
    /// Stock rows are locked in key order so concurrent settlements cannot
    /// deadlock. Any shortfall rolls the whole transaction back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Conflict` if it is already settled.
    /// Returns `RepositoryError::OutOfStock` if any line exceeds current stock,
    /// `RepositoryError::StockMissing` if a line's stock row is gone.
    pub async fn settle(
        &self,
        id: OrderId,
        payment: &PaymentConfirmation,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order: Order = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order o WHERE o.id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()?;

        if order.is_settled() {
            return Err(RepositoryError::Conflict(format!(
                "order {} is already settled",
                order.order_number
            )));
        }

        let mut wanted: BTreeMap<StockKey, u32> = BTreeMap::new();
        for line in &order.lines {
            *wanted.entry(line.key()).or_default() += line.qty;
        }

        for (key, &requested) in &wanted {
            let current: Option<i32> = sqlx::query_scalar(
                "SELECT qty FROM shop.stock WHERE product_id = $1 AND size = $2 FOR UPDATE",
            )
            .bind(key.product_id)
            .bind(&key.size)
            .fetch_optional(&mut *tx)
            .await?;

            let available = current
                .map(qty_from_db)
                .transpose()?
                .ok_or_else(|| RepositoryError::StockMissing(key.clone()))?;
            if available < requested {
                return Err(RepositoryError::OutOfStock {
                    key: key.clone(),
                    requested,
                    available,
                });
            }

            sqlx::query("UPDATE shop.stock SET qty = qty - $3 WHERE product_id = $1 AND size = $2")
                .bind(key.product_id)
                .bind(&key.size)
                .bind(qty_to_db(requested)?)
                .execute(&mut *tx)
                .await?;
        }

        let settled: Order = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE shop.customer_order o
            SET payment_key = $2, payment_method = $3, succeeded_at = NOW()
            WHERE o.id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&payment.payment_key)
        .bind(&payment.method)
        .fetch_one(&mut *tx)
        .await?
        .try_into()?;

        if let Some(user) = settled.user_id {
            let product_ids: Vec<i64> = wanted.keys().map(|k| k.product_id.as_i64()).collect();
            let sizes: Vec<String> = wanted.keys().map(|k| k.size.clone()).collect();
            sqlx::query(
                r"
                DELETE FROM shop.cart_line
                WHERE user_id = $1
                  AND (product_id, size) IN (
                      SELECT * FROM UNNEST($2::BIGINT[], $3::TEXT[])
                  )
                ",
            )
            .bind(user)
            .bind(&product_ids)
            .bind(&sizes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(settled)
    }
}
