use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use axum_helpers::auth::AuthUser;
use axum_helpers::envelope::ErrorCode;
use axum_helpers::extractors::ValidatedJson;
use serde_json::json;
use utoipa::OpenApi;

use crate::models::{ContactRequest, ContactSubject};
use crate::postgres::PostgresContactRepository;
use crate::service::ContactService;

/// OpenAPI documentation for the contact endpoint
#[derive(OpenApi)]
#[openapi(
    paths(submit_message),
    components(schemas(ContactRequest, ContactSubject)),
    tags(
        (name = "contact", description = "Contact form submissions")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct ContactState {
    pub service: ContactService<PostgresContactRepository>,
}

/// Public endpoint; composed behind the optional-auth layer so a
/// logged-in caller gets linked to the stored message.
pub fn router(state: ContactState) -> Router {
    Router::new()
        .route("/contact", post(submit_message))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored"),
        (status = 400, description = "Validation failed"),
    ),
    tag = "contact"
)]
pub async fn submit_message(
    State(state): State<ContactState>,
    auth: Option<Extension<AuthUser>>,
    ValidatedJson(request): ValidatedJson<ContactRequest>,
) -> Response {
    let user_id = auth.map(|Extension(user)| user.id);
    match state.service.submit(request, user_id).await {
        Ok(reference_id) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Your message has been sent successfully. We will get back to you within 24 hours.",
                "reference_id": reference_id,
            })),
        )
            .into_response(),
        Err(err) => err.respond(
            ErrorCode::ContactError,
            "Unable to send message due to a server error. Please try again later.",
        ),
    }
}
