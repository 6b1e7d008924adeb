//! Product and stock repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use maru_core::{Money, ProductId, Stock, StockKey};

use super::{RepositoryError, qty_from_db, qty_to_db};
use crate::models::{NewProduct, Product};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Money,
    category: String,
    images: Vec<String>,
    description: String,
    is_new: bool,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, stock: Vec<Stock>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            price: self.price,
            stock,
            category: self.category,
            images: self.images,
            description: self.description,
            is_new: self.is_new,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    product_id: ProductId,
    size: String,
    qty: i32,
}

const PRODUCT_COLUMNS: &str =
    "id, name, price, category, images, description, is_new, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog and stock queries.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product with its stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.get_many(&[id]).await?.pop())
    }

    /// Get several products with their stock. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stock row is negative.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(ProductId::as_i64).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        self.attach_stock(rows).await
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stock row is negative.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_stock(rows).await
    }

    async fn attach_stock(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id.as_i64()).collect();
        let stock_rows = sqlx::query_as::<_, StockRow>(
            r"
            SELECT product_id, size, qty
            FROM shop.stock
            WHERE product_id = ANY($1)
            ORDER BY product_id, size
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_product: HashMap<ProductId, Vec<Stock>> = HashMap::new();
        for row in stock_rows {
            by_product.entry(row.product_id).or_default().push(Stock {
                size: row.size,
                qty: qty_from_db(row.qty)?,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let stock = by_product.remove(&row.id).unwrap_or_default();
                row.into_product(stock)
            })
            .collect())
    }

    /// Insert a product and its stock counters in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a size is listed twice.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product (name, price, category, images, description, is_new)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.images)
        .bind(&product.description)
        .bind(product.is_new)
        .fetch_one(&mut *tx)
        .await?;

        for stock in &product.stock {
            sqlx::query("INSERT INTO shop.stock (product_id, size, qty) VALUES ($1, $2, $3)")
                .bind(row.id)
                .bind(&stock.size)
                .bind(qty_to_db(stock.qty)?)
                .execute(&mut *tx)
                .await
                .map_err(|e| super::unique_violation(e, "size"))?;
        }

        tx.commit().await?;
        Ok(row.into_product(product.stock.clone()))
    }

    /// Current stock for one product/size.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn read_stock(&self, key: &StockKey) -> Result<Option<u32>, RepositoryError> {
        let qty: Option<i32> =
            sqlx::query_scalar("SELECT qty FROM shop.stock WHERE product_id = $1 AND size = $2")
                .bind(key.product_id)
                .bind(&key.size)
                .fetch_optional(self.pool)
                .await?;

        qty.map(qty_from_db).transpose()
    }

    /// Compare-and-set a stock counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the counter does not exist.
    /// Returns `RepositoryError::Conflict` if it no longer reads `expected`.
    pub async fn write_stock(
        &self,
        key: &StockKey,
        expected: u32,
        new_qty: u32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.stock SET qty = $4
            WHERE product_id = $1 AND size = $2 AND qty = $3
            ",
        )
        .bind(key.product_id)
        .bind(&key.size)
        .bind(qty_to_db(expected)?)
        .bind(qty_to_db(new_qty)?)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }
        match self.read_stock(key).await? {
            Some(current) => Err(RepositoryError::Conflict(format!(
                "stock for {key} changed from {expected} to {current}"
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }
}
