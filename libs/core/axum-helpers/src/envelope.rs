//! Uniform JSON response envelope.
//!
//! Every response carries `{"success": bool, ...}`. Failures add a
//! `message`, a machine-readable `error` code, and optionally an
//! `errors` map of per-field messages:
//!
//! ```json
//! {
//!   "success": false,
//!   "message": "Invalid input data",
//!   "error": "VALIDATION_ERROR",
//!   "errors": {"email": ["A user with this email already exists."]}
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Machine-readable error identifiers surfaced in the `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    PermissionDenied,
    AuthenticationRequired,
    InvalidCredentials,
    DuplicateEntry,
    MissingToken,
    ServerError,
    FetchError,
    CreationError,
    UpdateError,
    DeleteError,
    SaveError,
    ProfileError,
    PasswordError,
    ContactError,
    FavoriteError,
    StatsError,
    SearchError,
    DatabaseError,
    IntegrityError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::DuplicateEntry => "DUPLICATE_ENTRY",
            Self::MissingToken => "MISSING_TOKEN",
            Self::ServerError => "SERVER_ERROR",
            Self::FetchError => "FETCH_ERROR",
            Self::CreationError => "CREATION_ERROR",
            Self::UpdateError => "UPDATE_ERROR",
            Self::DeleteError => "DELETE_ERROR",
            Self::SaveError => "SAVE_ERROR",
            Self::ProfileError => "PROFILE_ERROR",
            Self::PasswordError => "PASSWORD_ERROR",
            Self::ContactError => "CONTACT_ERROR",
            Self::FavoriteError => "FAVORITE_ERROR",
            Self::StatsError => "STATS_ERROR",
            Self::SearchError => "SEARCH_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::IntegrityError => "INTEGRITY_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure envelope body.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false` for failures
    pub success: bool,
    /// Human-readable error message
    pub message: String,
    /// Machine-readable error identifier
    pub error: ErrorCode,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

/// Build a failure response.
pub fn fail(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    let body = Json(ErrorBody {
        success: false,
        message: message.into(),
        error: code,
        errors: None,
    });
    (status, body).into_response()
}

/// Build a failure response with per-field messages.
pub fn fail_with_fields(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    fields: Value,
) -> Response {
    let body = Json(ErrorBody {
        success: false,
        message: message.into(),
        error: code,
        errors: Some(fields),
    });
    (status, body).into_response()
}

/// Build a plain success envelope with just a message.
pub fn ok_message(message: impl Into<String>) -> Response {
    Json(json!({
        "success": true,
        "message": message.into(),
    }))
    .into_response()
}

/// Fallback handler for unmatched routes.
pub async fn not_found() -> Response {
    fail(
        StatusCode::NOT_FOUND,
        ErrorCode::NotFound,
        "The requested resource was not found",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "\"VALIDATION_ERROR\"");
        let json = serde_json::to_string(&ErrorCode::AuthenticationRequired).unwrap();
        assert_eq!(json, "\"AUTHENTICATION_REQUIRED\"");
    }

    #[test]
    fn error_code_as_str_matches_serde() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::DuplicateEntry,
            ErrorCode::MissingToken,
            ErrorCode::StatsError,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::json!(code.as_str()));
        }
    }

    #[test]
    fn error_body_omits_empty_errors() {
        let body = ErrorBody {
            success: false,
            message: "Product not found".to_string(),
            error: ErrorCode::NotFound,
            errors: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["error"], serde_json::json!("NOT_FOUND"));
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn error_body_includes_field_errors() {
        let body = ErrorBody {
            success: false,
            message: "Invalid input data".to_string(),
            error: ErrorCode::ValidationError,
            errors: Some(serde_json::json!({"email": ["Enter a valid email address."]})),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value["errors"]["email"][0],
            serde_json::json!("Enter a valid email address.")
        );
    }
}
