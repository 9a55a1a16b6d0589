use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Failure of a single portal operation
#[derive(Debug, Error)]
pub enum PortalError {
    /// No session token, or the token does not verify
    #[error("authentication required")]
    Unauthenticated,

    /// Valid session without administrator rights
    #[error("administrator privileges required")]
    Forbidden,

    /// Missing or empty required field
    #[error("{0}")]
    Validation(String),

    /// Malformed argument such as a bad reorder permutation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("identifier already exists: {0}")]
    DuplicateIdentifier(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Backend(#[from] DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::Unauthenticated => StatusCode::UNAUTHORIZED,
            PortalError::Forbidden => StatusCode::FORBIDDEN,
            PortalError::Validation(_) | PortalError::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::DuplicateIdentifier(_) | PortalError::Conflict(_) => StatusCode::CONFLICT,
            PortalError::Backend(_) | PortalError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller; storage details stay in the log
    pub fn public_message(&self) -> String {
        match self {
            PortalError::Backend(_) | PortalError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Map a unique-constraint violation to `DuplicateIdentifier`
    pub fn from_insert(err: DbErr, identifier: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                PortalError::DuplicateIdentifier(identifier.to_string())
            }
            _ => PortalError::Backend(err),
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status.as_u16(), self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
