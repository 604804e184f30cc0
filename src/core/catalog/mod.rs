//! Product catalog
//!
//! Service logic and the bearer-protected HTTP routes for products.

pub mod api;
pub mod service;

pub use api::{CatalogApiState, catalog_api_router};
pub use service::{CatalogError, CatalogService, parse_product_id};
