//! Account service
//!
//! Registration and login. Coordinates the user store, the password hasher
//! and the JWT service. Each register or login runs under one deadline that
//! covers all of its store calls and hashing.

use axum::response::{IntoResponse, Response};
use mongodb::bson::DateTime;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::auth::jwt::{JwtError, JwtService, TokenPair};
use crate::core::auth::password::{
    MAX_PASSWORD_BYTES, PasswordError, hash_password, verify_password,
};
use crate::core::db::models::User;
use crate::core::db::repositories::{StoreError, UserStore};
use crate::core::error::{ErrorKind, error_response};

/// Minimum username length in characters
pub const USERNAME_MIN_LEN: usize = 2;

/// Maximum username length in characters
pub const USERNAME_MAX_LEN: usize = 30;

/// Account service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("user already exist")]
    UserAlreadyExists,

    #[error("Login or Password is incorrect")]
    InvalidCredentials,

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) => ErrorKind::InvalidInput,
            AuthError::UserAlreadyExists => ErrorKind::Conflict,
            AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::Timeout(_) => ErrorKind::Timeout,
            AuthError::InternalError(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AuthError::UserAlreadyExists,
            StoreError::Timeout(limit) => AuthError::Timeout(limit),
            StoreError::DatabaseError(e) => AuthError::InternalError(e.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::InternalError(err.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::InternalError(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account service
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    jwt_service: JwtService,
    deadline: Duration,
}

impl AccountService {
    /// Create a new account service
    pub fn new(users: Arc<dyn UserStore>, jwt_service: JwtService, deadline: Duration) -> Self {
        Self {
            users,
            jwt_service,
            deadline,
        }
    }

    /// Validate request structure
    fn validate_registration(request: &RegisterRequest) -> Result<(), AuthError> {
        let len = request.username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            return Err(AuthError::InvalidInput(format!(
                "username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
            )));
        }

        if request.password.is_empty() {
            return Err(AuthError::InvalidInput("password is required".to_string()));
        }

        if request.password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::InvalidInput(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        Ok(())
    }

    /// Run a whole account operation under the request deadline
    async fn within_deadline<T, F>(&self, operation: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        tokio::time::timeout(self.deadline, operation)
            .await
            .unwrap_or(Err(AuthError::Timeout(self.deadline)))
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterRequest) -> Result<(), AuthError> {
        Self::validate_registration(&request)?;

        self.within_deadline(self.create_user(request)).await
    }

    async fn create_user(&self, request: RegisterRequest) -> Result<(), AuthError> {
        if self.users.count_by_username(&request.username).await? > 0 {
            return Err(AuthError::UserAlreadyExists);
        }

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::InternalError(e.to_string()))??;

        let mut user = User::new(request.username, password_hash);
        let tokens = self.jwt_service.issue(&user.username, &user.user_id)?;
        user.token = Some(tokens.access_token);
        user.refresh_token = Some(tokens.refresh_token);

        // The unique index decides races that slip past the count above
        self.users.insert(&user).await?;

        tracing::info!(username = %user.username, user_id = %user.user_id, "User registered");
        Ok(())
    }

    /// Login an existing user and rotate their stored token pair
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AuthError> {
        self.within_deadline(self.authenticate(request)).await
    }

    async fn authenticate(&self, request: LoginRequest) -> Result<TokenPair, AuthError> {
        let Some(user) = self.users.find_by_username(&request.username).await? else {
            tracing::info!(username = %request.username, "Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let password = request.password;
        let valid = tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
            .await
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        if !valid {
            tracing::info!(username = %user.username, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.jwt_service.issue(&user.username, &user.user_id)?;

        self.users
            .update_all_tokens(
                &user.user_id,
                &tokens.access_token,
                &tokens.refresh_token,
                DateTime::now(),
            )
            .await?;

        tracing::info!(username = %user.username, "User logged in");
        Ok(tokens)
    }
}
