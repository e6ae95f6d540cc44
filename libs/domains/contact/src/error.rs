use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::envelope::{fail, fail_with_fields, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: serde_json::Value,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl ContactError {
    pub fn respond(self, fallback_code: ErrorCode, fallback_message: &str) -> Response {
        match self {
            Self::Database(details) => {
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

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { message, fields } => {
                fail_with_fields(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, &message, fields)
            }
            Self::Database(details) => {
                tracing::error!(%details, "database error");
                fail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError,
                    "A database error occurred.",
                )
            }
        }
    }
}

impl From<sea_orm::DbErr> for ContactError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}
