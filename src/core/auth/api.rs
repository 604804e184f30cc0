//! Account API endpoints
//!
//! - POST /register - Register a new user
//! - POST /login - Login and get an access token

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::{AccountService, AuthError, LoginRequest, RegisterRequest};
use crate::core::error::JsonBody;

/// Body returned by a successful registration
pub const ACCOUNT_CREATED_MESSAGE: &str = "account created successfully";

/// Account API state containing the account service
#[derive(Clone)]
pub struct AuthApiState {
    pub account_service: AccountService,
}

/// Response for login. Only the access token leaves the server
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Create the account API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .with_state(state)
}

/// POST /register
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    tracing::info!(username = %request.username, "Registration attempt");

    state.account_service.register(request).await?;

    Ok((StatusCode::CREATED, Json(ACCOUNT_CREATED_MESSAGE)))
}

/// POST /login
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    tracing::info!(username = %request.username, "Login attempt");

    let tokens = state.account_service.login(request).await?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
    }))
}
