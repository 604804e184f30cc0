//! Request-time authorization gate
//!
//! [`require_auth`] runs as a `route_layer` on protected routers. It reads the
//! bearer token, validates it and stores an [`AuthContext`] in the request
//! extensions. Handlers pick the context up through its extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::core::auth::jwt::{Claims, JwtError, JwtService, TokenType};
use crate::core::error::{ErrorKind, error_response};

/// Rejections produced by the gate
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Authorization header not provided")]
    MissingHeader,

    #[error("Authorization header format must be Bearer {{access_token}}")]
    BadHeaderFormat,

    #[error(transparent)]
    InvalidToken(#[from] JwtError),

    #[error("Request was not authenticated")]
    MissingContext,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let kind = match self {
            // Reaching a handler without the gate is a wiring bug
            GateError::MissingContext => ErrorKind::Internal,
            _ => ErrorKind::Unauthorized,
        };
        error_response(kind, self.to_string())
    }
}

/// Gate configuration: the token service and the token type it admits
#[derive(Clone)]
pub struct AuthGate {
    jwt_service: JwtService,
    required: TokenType,
}

impl AuthGate {
    pub fn new(jwt_service: JwtService, required: TokenType) -> Self {
        Self {
            jwt_service,
            required,
        }
    }

    /// Gate admitting access tokens only
    pub fn access(jwt_service: JwtService) -> Self {
        Self::new(jwt_service, TokenType::Access)
    }

    /// Validate a token and check it carries the required type
    pub fn authorize(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = match self.required {
            TokenType::Access => self.jwt_service.validate_access_token(token)?,
            TokenType::Refresh => self.jwt_service.validate(token)?,
        };

        if claims.token_type != self.required {
            return Err(JwtError::InvalidTokenType);
        }

        Ok(claims)
    }
}

/// Identity of the caller, set by [`require_auth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub user_id: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            user_id: claims.uid,
        }
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(GateError::MissingContext)
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The value must split on single spaces into exactly two fields, the first
/// being `bearer` in any case.
pub fn parse_bearer(value: Option<&str>) -> Result<&str, GateError> {
    let value = match value {
        None | Some("") => return Err(GateError::MissingHeader),
        Some(value) => value,
    };

    let mut fields = value.split(' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(GateError::BadHeaderFormat),
    }
}

/// Middleware rejecting requests without a valid bearer token
pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let header_value = match request.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| GateError::BadHeaderFormat)?),
    };

    let token = parse_bearer(header_value)?;

    let claims = gate.authorize(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        GateError::InvalidToken(e)
    })?;

    request.extensions_mut().insert(AuthContext::from(claims));

    Ok(next.run(request).await)
}
