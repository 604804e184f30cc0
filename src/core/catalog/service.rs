//! Catalog service
//!
//! Listing, creation and quantity updates for products. Products are never
//! deleted and only their quantity changes after creation.

use axum::response::{IntoResponse, Response};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::Deadlines;
use crate::core::db::models::{NewProduct, Product};
use crate::core::db::repositories::{ProductStore, StoreError, with_deadline};
use crate::core::error::{ErrorKind, error_response};

/// Catalog error types
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid product ID")]
    InvalidProductId,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Invalid price")]
    InvalidPrice,

    #[error("Product not found")]
    NotFound,

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidProductId
            | CatalogError::InvalidQuantity
            | CatalogError::InvalidPrice => ErrorKind::InvalidInput,
            CatalogError::NotFound => ErrorKind::NotFound,
            CatalogError::Timeout(_) => ErrorKind::Timeout,
            CatalogError::StoreError(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout(limit) => CatalogError::Timeout(limit),
            other => CatalogError::StoreError(other.to_string()),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

/// Parse a 24-character hex product identifier
pub fn parse_product_id(id: &str) -> Result<ObjectId, CatalogError> {
    ObjectId::parse_str(id).map_err(|_| CatalogError::InvalidProductId)
}

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
    deadlines: Deadlines,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductStore>, deadlines: Deadlines) -> Self {
        Self {
            products,
            deadlines,
        }
    }

    /// Every product in the catalog
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        let products = with_deadline(self.deadlines.standard, self.products.list_all()).await?;
        Ok(products)
    }

    /// Validate and store a new product, returning its identifier
    pub async fn create(&self, new_product: NewProduct) -> Result<ObjectId, CatalogError> {
        if new_product.quantity < 0 {
            return Err(CatalogError::InvalidQuantity);
        }
        if !new_product.price.is_finite() || new_product.price < 0.0 {
            return Err(CatalogError::InvalidPrice);
        }

        let product = new_product.into_product();
        with_deadline(self.deadlines.standard, self.products.insert(&product)).await?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "Product added");
        Ok(product.id)
    }

    /// Set the quantity of a product and return the updated document
    pub async fn update_quantity(&self, id: &str, quantity: i64) -> Result<Product, CatalogError> {
        let id = parse_product_id(id)?;
        if quantity < 0 {
            return Err(CatalogError::InvalidQuantity);
        }

        let product = with_deadline(self.deadlines.quick, self.products.set_quantity(id, quantity))
            .await?
            .ok_or(CatalogError::NotFound)?;

        tracing::info!(product_id = %id, quantity, "Product quantity updated");
        Ok(product)
    }
}
