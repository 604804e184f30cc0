//! HTTP application assembly
//!
//! Wires the stores and configuration into the services and merges the
//! account and product routers under a request trace layer.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::core::auth::{
    AccountService, AuthApiState, AuthGate, JwtConfig, JwtService, auth_api_router,
};
use crate::core::catalog::{CatalogApiState, CatalogService, catalog_api_router};
use crate::core::config::{Config, Deadlines};
use crate::core::db::{ProductStore, UserStore};

/// Services shared by all routers
#[derive(Clone)]
pub struct AppServices {
    pub account_service: AccountService,
    pub catalog_service: CatalogService,
    pub jwt_service: JwtService,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
        jwt_service: JwtService,
        deadlines: Deadlines,
    ) -> Self {
        Self {
            account_service: AccountService::new(users, jwt_service.clone(), deadlines.standard),
            catalog_service: CatalogService::new(products, deadlines),
            jwt_service,
        }
    }

    /// Build services from the application configuration
    pub fn from_config(
        config: &Config,
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        let jwt_service = JwtService::new(JwtConfig::from_config(config));
        Self::new(users, products, jwt_service, config.deadlines)
    }
}

/// Build the application router
pub fn router(services: AppServices) -> Router {
    let gate = AuthGate::access(services.jwt_service);

    Router::new()
        .merge(auth_api_router(AuthApiState {
            account_service: services.account_service,
        }))
        .merge(catalog_api_router(
            CatalogApiState {
                catalog_service: services.catalog_service,
            },
            gate,
        ))
        .layer(TraceLayer::new_for_http())
}
