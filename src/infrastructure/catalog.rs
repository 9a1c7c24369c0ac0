use crate::domain::ports::{CatalogError, CatalogService};
use crate::domain::product::Product;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

const BUNDLED_PRODUCTS: &str = include_str!("../../data/products.json");

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

#[derive(Debug, Clone)]
enum Source {
    Bundled,
    Path(PathBuf),
}

/// Reads products from a `{"products": [...]}` JSON document.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    source: Source,
}

impl FileCatalog {
    /// The product list shipped with the crate.
    pub fn bundled() -> Self {
        Self {
            source: Source::Bundled,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Path(path.into()),
        }
    }

    fn decode(json: &str) -> std::result::Result<Vec<Product>, CatalogError> {
        let response: ProductsResponse =
            serde_json::from_str(json).map_err(|e| CatalogError::DecodingError(e.to_string()))?;
        if response.products.is_empty() {
            return Err(CatalogError::NoData);
        }
        Ok(response.products)
    }
}

#[async_trait]
impl CatalogService for FileCatalog {
    async fn fetch_products(&self) -> std::result::Result<Vec<Product>, CatalogError> {
        match &self.source {
            Source::Bundled => Self::decode(BUNDLED_PRODUCTS),
            Source::Path(path) if path.as_os_str().is_empty() => Err(CatalogError::InvalidUrl),
            Source::Path(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| CatalogError::NetworkError(e.to_string()))?;
                Self::decode(&json)
            }
        }
    }
}

/// Fetches the catalog and returns the product with `id`.
pub async fn find_product(catalog: &dyn CatalogService, id: &str) -> Result<Product> {
    catalog
        .fetch_products()
        .await?
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| PaymentError::UnknownProduct(id.to_string()))
}
