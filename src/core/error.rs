//! Error kinds shared by every API surface
//!
//! Services keep their own error enums; each one classifies itself into an
//! [`ErrorKind`], which decides the HTTP status and the machine-readable code.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Message returned for internal failures instead of the underlying error text
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message returned when a store deadline elapses
pub const TIMEOUT_MESSAGE: &str = "The request timed out";

/// Error classification used to build HTTP responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Conflict,
    Unauthorized,
    NotFound,
    Internal,
    Timeout,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }
}

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Build the JSON error response for `kind`.
///
/// Internal and timeout failures never expose `message`; it is logged instead.
pub fn error_response(kind: ErrorKind, message: String) -> Response {
    let public_message = match kind {
        ErrorKind::Internal => {
            tracing::error!(error = %message, "request failed with internal error");
            INTERNAL_ERROR_MESSAGE.to_string()
        }
        ErrorKind::Timeout => {
            tracing::error!(error = %message, "request exceeded store deadline");
            TIMEOUT_MESSAGE.to_string()
        }
        _ => message,
    };

    let body = ApiError::new(public_message, kind.code());

    (kind.status(), Json(body)).into_response()
}

/// JSON body extractor whose rejections use the common error shape.
///
/// Malformed JSON, a wrong content type and missing fields all become
/// `400 INVALID_INPUT`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(error_response(
                ErrorKind::InvalidInput,
                rejection.body_text(),
            )),
        }
    }
}
