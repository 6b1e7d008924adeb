//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Linen Shirt
//!     price: 59000
//!     category: tops
//!     stock:
//!       - { size: M, qty: 6 }
//! ```
//!
//! The whole file is parsed before connecting. Each product is created
//! through the catalog service, so the same validation applies as for any
//! other listing.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use maru_commerce::models::NewProduct;

/// Top-level layout of a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<NewProduct>,
}

/// Parse a catalog file's contents.
///
/// # Errors
///
/// Returns the YAML error if the document does not match [`CatalogFile`].
pub fn parse(content: &str) -> Result<CatalogFile, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Create every product listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// is unreachable. Products rejected by validation are logged and skipped.
pub async fn catalog(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file_path.exists() {
        return Err(format!("File not found: {}", file_path.display()).into());
    }

    info!(path = %file_path.display(), "Loading catalog from file");
    let content = tokio::fs::read_to_string(file_path).await?;
    let file = parse(&content)?;
    info!(products = file.products.len(), "Parsed catalog");

    let shop = super::connect().await?;

    let mut created = 0_usize;
    let mut failed = 0_usize;
    for product in &file.products {
        match shop.catalog.create(product).await {
            Ok(p) => {
                created += 1;
                info!(id = %p.id, name = %p.name, sizes = p.stock.len(), "Product created");
            }
            Err(e) => {
                failed += 1;
                error!(name = %product.name, "Skipped: {e}");
            }
        }
    }

    info!("Seeding complete!");
    info!("  Products created: {created}");
    if failed > 0 {
        error!("  Products skipped: {failed}");
    }

    Ok(())
}
