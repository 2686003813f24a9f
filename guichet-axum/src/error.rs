use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use guichet_core::{AuthError, Error, StorageError};
use serde_json::json;
use thiserror::Error;

/// HTTP-facing error. Core errors are mapped here exactly once, at the
/// boundary; handlers pick the mapping that fits their endpoint (a missing
/// token row is a 400 on auth endpoints but a 404 on the admin surface).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request")]
    Validation(String),

    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Mapping for the `/auth` endpoints.
    pub fn from_auth(err: Error) -> Self {
        match err {
            Error::Validation(v) => ApiError::Validation(v.to_string()),
            Error::Auth(AuthError::InvalidCredentials) => ApiError::InvalidCredentials,
            Error::Auth(AuthError::EmailNotVerified) => ApiError::EmailNotVerified,
            Error::Storage(StorageError::Duplicate(_)) => ApiError::EmailInUse,
            Error::Storage(StorageError::NotFound) => ApiError::InvalidToken,
            other => ApiError::Internal(other.to_string()),
        }
    }

    /// Mapping for the `/users` admin surface.
    pub fn from_admin(err: Error) -> Self {
        match err {
            Error::Validation(v) => ApiError::Validation(v.to_string()),
            Error::Storage(StorageError::NotFound) => ApiError::NotFound,
            Error::Storage(StorageError::Duplicate(_)) => ApiError::EmailInUse,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ApiError::Validation(details) => (StatusCode::BAD_REQUEST, Some(details.clone())),
            ApiError::EmailInUse => (StatusCode::CONFLICT, None),
            ApiError::InvalidToken => (StatusCode::BAD_REQUEST, None),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, None),
            ApiError::EmailNotVerified => (StatusCode::FORBIDDEN, None),
            ApiError::NotFound => (StatusCode::NOT_FOUND, None),
            ApiError::Internal(detail) => {
                // internals are logged, never echoed
                tracing::error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = match details {
            Some(details) => Json(json!({ "error": self.to_string(), "details": details })),
            None => Json(json!({ "error": self.to_string() })),
        };

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
