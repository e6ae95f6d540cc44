use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::envelope::{fail, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FavoriteError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FavoriteError {
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

impl IntoResponse for FavoriteError {
    fn into_response(self) -> Response {
        match self {
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

impl From<sea_orm::DbErr> for FavoriteError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<domain_catalog::CatalogError> for FavoriteError {
    fn from(err: domain_catalog::CatalogError) -> Self {
        match err {
            domain_catalog::CatalogError::NotFound(m) => Self::NotFound(m),
            domain_catalog::CatalogError::PermissionDenied(m) => Self::PermissionDenied(m),
            domain_catalog::CatalogError::Database(d) => Self::Database(d),
            other => Self::Internal(other.to_string()),
        }
    }
}
