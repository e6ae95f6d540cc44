use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::envelope::{fail, fail_with_fields, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: serde_json::Value,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>, fields: serde_json::Value) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Renders the error, routing unexpected failures to an
    /// endpoint-specific code and message instead of the generic 500.
    pub fn respond(self, fallback_code: ErrorCode, fallback_message: &str) -> Response {
        match self {
            Self::Database(details) | Self::Internal(details) => {
                tracing::error!(%details, "request failed");
                fail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    fallback_code,
                    fallback_message,
                )
            }
            other => other.into_response(),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { message, fields } => {
                fail_with_fields(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, &message, fields)
            }
            Self::NotFound(message) => fail(StatusCode::NOT_FOUND, ErrorCode::NotFound, &message),
            Self::PermissionDenied(message) => fail(
                StatusCode::FORBIDDEN,
                ErrorCode::PermissionDenied,
                &message,
            ),
            Self::Database(details) => {
                tracing::error!(%details, "database error");
                fail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError,
                    "A database error occurred.",
                )
            }
            Self::Internal(details) => {
                tracing::error!(%details, "internal error");
                fail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::ServerError,
                    "An unexpected error occurred.",
                )
            }
        }
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}
