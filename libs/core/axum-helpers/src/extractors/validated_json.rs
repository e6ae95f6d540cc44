//! JSON extractor with automatic validation using the validator crate.

use crate::envelope::{ErrorCode, fail, fail_with_fields};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::Response,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON extractor that runs `Validate` on the deserialized body.
///
/// Rejections are rendered in the standard envelope: a malformed body
/// yields a bare `VALIDATION_ERROR`, a failed validation adds an
/// `errors` map of per-field message lists.
///
/// # Example
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct ContactRequest {
///     #[validate(length(min = 1, max = 100))]
///     name: String,
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn submit(ValidatedJson(payload): ValidatedJson<ContactRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|e| {
            fail(
                StatusCode::BAD_REQUEST,
                ErrorCode::ValidationError,
                e.body_text(),
            )
        })?;

        data.validate().map_err(|e| {
            fail_with_fields(
                StatusCode::BAD_REQUEST,
                ErrorCode::ValidationError,
                "Invalid input data",
                field_errors(&e),
            )
        })?;

        Ok(ValidatedJson(data))
    }
}

/// Flatten `ValidationErrors` into `{field: [messages]}`.
pub fn field_errors(errors: &ValidationErrors) -> serde_json::Value {
    let map = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages: Vec<serde_json::Value> = errs
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => serde_json::json!(msg),
                    None => serde_json::json!(format!("Invalid value for this field ({}).", err.code)),
                })
                .collect();
            (field.to_string(), serde_json::json!(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(serde::Deserialize, Validate)]
    struct Payload {
        #[validate(email(message = "Enter a valid email address."))]
        email: String,
        #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
        password: String,
    }

    #[test]
    fn field_errors_keyed_by_field_name() {
        let payload = Payload {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errs = payload.validate().unwrap_err();
        let value = field_errors(&errs);

        assert_eq!(
            value["email"][0],
            serde_json::json!("Enter a valid email address.")
        );
        assert_eq!(
            value["password"][0],
            serde_json::json!("Password must be at least 8 characters long.")
        );
    }

    #[test]
    fn valid_payload_has_no_errors() {
        let payload = Payload {
            email: "farmer@example.com".to_string(),
            password: "sufficiently-long".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}
