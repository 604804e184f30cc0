//! JWT utilities for token generation and validation
//!
//! Provides JWT token creation and validation using HS256 algorithm.
//! Access tokens live for 24 hours, refresh tokens for 7 days. Both carry
//! the same identity claims and differ only in `token_type` and expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::Config;

/// Default access token expiration time (24 hours)
const ACCESS_TOKEN_EXPIRATION_HOURS: i64 = 24;

/// Default refresh token expiration time (7 days)
const REFRESH_TOKEN_EXPIRATION_HOURS: i64 = 168;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token expiration in hours
    pub access_token_expiration_hours: i64,
    /// Refresh token expiration in hours
    pub refresh_token_expiration_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field(
                "access_token_expiration_hours",
                &self.access_token_expiration_hours,
            )
            .field(
                "refresh_token_expiration_hours",
                &self.refresh_token_expiration_hours,
            )
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiration_hours: ACCESS_TOKEN_EXPIRATION_HOURS,
            refresh_token_expiration_hours: REFRESH_TOKEN_EXPIRATION_HOURS,
        }
    }

    /// Create config from the application configuration.
    ///
    /// A missing secret is tolerated: tokens are then signed with an empty key.
    pub fn from_config(config: &Config) -> Self {
        let secret = match &config.secret_key {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!("SECRET_KEY is not set; tokens are signed with an empty key");
                String::new()
            }
        };

        Self {
            secret,
            access_token_expiration_hours: config
                .access_token_hours
                .unwrap_or(ACCESS_TOKEN_EXPIRATION_HOURS),
            refresh_token_expiration_hours: config
                .refresh_token_hours
                .unwrap_or(REFRESH_TOKEN_EXPIRATION_HOURS),
        }
    }

    /// Set access token expiration
    pub fn access_token_expiration(mut self, hours: i64) -> Self {
        self.access_token_expiration_hours = hours;
        self
    }

    /// Set refresh token expiration
    pub fn refresh_token_expiration(mut self, hours: i64) -> Self {
        self.refresh_token_expiration_hours = hours;
        self
    }
}

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Invalid token type")]
    InvalidTokenType,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Malformed(err.to_string()),
        }
    }
}

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub username: String,
    /// User identifier (hex ObjectId)
    pub uid: String,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    /// Check if this is an access token
    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }
}

/// Token pair (access + refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived)
    pub access_token: String,
    /// Refresh token (long-lived)
    pub refresh_token: String,
    /// Access token expiration (Unix timestamp)
    pub access_expires_at: i64,
    /// Refresh token expiration (Unix timestamp)
    pub refresh_expires_at: i64,
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn sign(
        &self,
        username: &str,
        user_id: &str,
        token_type: TokenType,
        now: DateTime<Utc>,
        lifetime_hours: i64,
    ) -> Result<(String, i64), JwtError> {
        let exp = Duration::try_hours(lifetime_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .filter(|exp| *exp > now)
            .ok_or_else(|| {
                JwtError::EncodingError(format!(
                    "{token_type} token lifetime of {lifetime_hours} hours is out of range"
                ))
            })?;

        let claims = Claims {
            username: username.to_string(),
            uid: user_id.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, exp.timestamp()))
    }

    /// Issue an access and refresh token for a user
    pub fn issue(&self, username: &str, user_id: &str) -> Result<TokenPair, JwtError> {
        self.issue_at(username, user_id, Utc::now())
    }

    /// Issue a token pair as if the current time were `now`
    pub fn issue_at(
        &self,
        username: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, JwtError> {
        let (access_token, access_expires_at) = self.sign(
            username,
            user_id,
            TokenType::Access,
            now,
            self.config.access_token_expiration_hours,
        )?;
        let (refresh_token, refresh_expires_at) = self.sign(
            username,
            user_id,
            TokenType::Refresh,
            now,
            self.config.refresh_token_expiration_hours,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Validate and decode a token
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token against an explicit clock (Unix seconds).
    ///
    /// A token whose expiry equals `now` is already expired.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        // Expiry is checked below with an inclusive bound
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        let claims = token_data.claims;

        if claims.exp <= now {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// Validate an access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate(token)?;

        if !claims.is_access_token() {
            return Err(JwtError::InvalidTokenType);
        }

        Ok(claims)
    }
}
