//! Product API endpoints
//!
//! Every route here sits behind the bearer-token gate:
//! - GET /products - List all products
//! - POST /products - Add a product
//! - PUT /products/{id}/quantity - Set the stock quantity of a product

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::auth::{AuthContext, AuthGate, require_auth};
use crate::core::catalog::service::{CatalogError, CatalogService, parse_product_id};
use crate::core::db::models::{NewProduct, ProductResponse};
use crate::core::error::JsonBody;

/// Catalog API state
#[derive(Clone)]
pub struct CatalogApiState {
    pub catalog_service: CatalogService,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a created product
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedProductResponse {
    pub message: String,
    pub product_id: String,
}

/// Request body for a quantity update
#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

// ============================================================================
// Router
// ============================================================================

/// Create the product router, guarded by `gate`
pub fn catalog_api_router(state: CatalogApiState, gate: AuthGate) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}/quantity", put(update_quantity))
        .route_layer(middleware::from_fn_with_state(gate, require_auth))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /products
async fn list_products(
    State(state): State<Arc<CatalogApiState>>,
    auth: AuthContext,
) -> Result<Json<Vec<ProductResponse>>, CatalogError> {
    let products = state.catalog_service.list().await?;

    tracing::debug!(username = %auth.username, count = products.len(), "Listed products");

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// POST /products
async fn create_product(
    State(state): State<Arc<CatalogApiState>>,
    auth: AuthContext,
    JsonBody(new_product): JsonBody<NewProduct>,
) -> Result<(StatusCode, Json<CreatedProductResponse>), CatalogError> {
    let product_id = state.catalog_service.create(new_product).await?;

    tracing::info!(username = %auth.username, product_id = %product_id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedProductResponse {
            message: "Product added successfully".to_string(),
            product_id: product_id.to_hex(),
        }),
    ))
}

/// PUT /products/{id}/quantity
async fn update_quantity(
    State(state): State<Arc<CatalogApiState>>,
    Path(id): Path<String>,
    payload: Result<Json<QuantityUpdate>, JsonRejection>,
) -> Result<Json<ProductResponse>, CatalogError> {
    // A bad id wins over a bad body
    parse_product_id(&id)?;
    let Json(update) = payload.map_err(|_| CatalogError::InvalidQuantity)?;

    let product = state
        .catalog_service
        .update_quantity(&id, update.quantity)
        .await?;

    Ok(Json(product.into()))
}
