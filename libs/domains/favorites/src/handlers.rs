use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use axum_helpers::auth::AuthUser;
use axum_helpers::envelope::ErrorCode;
use serde_json::json;
use utoipa::OpenApi;

use crate::error::FavoriteError;
use crate::models::{FavoriteEntry, ToggleOutcome};
use crate::postgres::PostgresFavoriteRepository;
use crate::service::FavoriteService;

/// OpenAPI documentation for the favorites endpoints
#[derive(OpenApi)]
#[openapi(
    paths(toggle_favorite, list_favorites),
    components(schemas(FavoriteEntry)),
    tags(
        (name = "favorites", description = "HoReCa favorite products")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct FavoriteState {
    pub service: FavoriteService<PostgresFavoriteRepository>,
}

pub fn router(state: FavoriteState) -> Router {
    Router::new()
        .route("/favorites", get(list_favorites))
        .route("/favorites/toggle/{product_id}", post(toggle_favorite))
        .with_state(state)
}

fn require_horeca(auth: &AuthUser) -> Result<(), FavoriteError> {
    if auth.user_type == "horeca" {
        Ok(())
    } else {
        Err(FavoriteError::PermissionDenied(
            "Only HoReCa users can manage favorites.".to_string(),
        ))
    }
}

#[utoipa::path(
    post,
    path = "/api/favorites/toggle/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    responses(
        (status = 201, description = "Added to favorites"),
        (status = 200, description = "Removed from favorites"),
        (status = 403, description = "Caller is not a HoReCa user"),
        (status = 404, description = "Product unknown or unavailable"),
    ),
    tag = "favorites",
    security(("bearer_auth" = []))
)]
pub async fn toggle_favorite(
    State(state): State<FavoriteState>,
    Extension(auth): Extension<AuthUser>,
    Path(product_id): Path<i32>,
) -> Response {
    if let Err(err) = require_horeca(&auth) {
        return err.into_response();
    }
    match state.service.toggle(auth.id, product_id).await {
        Ok(ToggleOutcome::Added) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Product added to favorites",
                "action": "added",
            })),
        )
            .into_response(),
        Ok(ToggleOutcome::Removed) => Json(json!({
            "success": true,
            "message": "Product removed from favorites",
            "action": "removed",
        }))
        .into_response(),
        Err(err) => err.respond(
            ErrorCode::FavoriteError,
            "Unable to update favorites. Please try again.",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    responses(
        (status = 200, description = "Caller's favorite products"),
        (status = 403, description = "Caller is not a HoReCa user"),
    ),
    tag = "favorites",
    security(("bearer_auth" = []))
)]
pub async fn list_favorites(
    State(state): State<FavoriteState>,
    Extension(auth): Extension<AuthUser>,
) -> Response {
    if let Err(err) = require_horeca(&auth) {
        return err.into_response();
    }
    match state.service.list(auth.id).await {
        Ok(favorites) => Json(json!({"success": true, "favorites": favorites})).into_response(),
        Err(err) => err.respond(ErrorCode::FetchError, "Unable to fetch favorites."),
    }
}
