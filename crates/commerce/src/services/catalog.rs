//! Catalog reads and product listing.

use std::sync::Arc;

use tracing::{info, instrument};

use maru_core::ProductId;

use crate::error::{CommerceError, Result};
use crate::models::{NewProduct, Product};
use crate::store::Store;

/// Product catalog operations.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if storage fails.
    pub async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        self.store
            .product(id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("product {id}")))
    }

    /// List a new product with its initial stock.
    ///
    /// # Errors
    ///
    /// - `Validation` if the name is blank, the price is negative, or a
    ///   size is blank or listed twice
    /// - `Conflict` if storage rejects a duplicate size
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product> {
        validate_product(product)?;
        let created = self.store.create_product(product).await?;
        info!(product = %created.id, sizes = created.stock.len(), "product listed");
        Ok(created)
    }
}

fn validate_product(product: &NewProduct) -> Result<()> {
    if product.name.trim().is_empty() {
        return Err(CommerceError::validation("name", "must not be blank"));
    }
    if product.price.units() < 0 {
        return Err(CommerceError::validation("price", "must not be negative"));
    }
    let mut seen = std::collections::HashSet::new();
    for stock in &product.stock {
        if stock.size.trim().is_empty() {
            return Err(CommerceError::validation("stock", "size must not be blank"));
        }
        if !seen.insert(stock.size.as_str()) {
            return Err(CommerceError::validation(
                "stock",
                format!("size {} listed twice", stock.size),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maru_core::{Money, Stock};

    use super::super::test_support;
    use super::*;

    fn new_product(sizes: &[&str]) -> NewProduct {
        NewProduct {
            name: "Wool coat".to_owned(),
            price: Money::new(189_000),
            stock: sizes
                .iter()
                .map(|s| Stock {
                    size: (*s).to_owned(),
                    qty: 4,
                })
                .collect(),
            category: "outer".to_owned(),
            images: Vec::new(),
            description: String::new(),
            is_new: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let catalog = CatalogService::new(test_support::store());
        let first = catalog.create(&new_product(&["S", "M"])).await.unwrap();
        let second = catalog.create(&new_product(&["F"])).await.unwrap();

        let ids: Vec<_> = catalog.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(catalog.get(first.id).await.unwrap().stock_for("M"), Some(4));
    }

    #[tokio::test]
    async fn test_duplicate_size_rejected() {
        let catalog = CatalogService::new(test_support::store());
        let err = catalog.create(&new_product(&["M", "M"])).await.unwrap_err();
        assert!(matches!(err, CommerceError::Validation { field: "stock", .. }));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let catalog = CatalogService::new(test_support::store());
        let err = catalog.get(ProductId::new(7)).await.unwrap_err();
        assert!(matches!(err, CommerceError::NotFound(_)));
    }
}
