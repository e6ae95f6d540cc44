//! API route composition

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use axum_helpers::auth::{jwt_auth_middleware, optional_jwt_auth_middleware};
use domain_catalog::{CatalogService, CatalogState, PostgresCatalogRepository};
use domain_contact::{ContactService, ContactState, PostgresContactRepository};
use domain_favorites::{FavoriteService, FavoriteState, PostgresFavoriteRepository};
use domain_users::{AuthState, PostgresUserRepository, UserService};
use serde_json::json;

use crate::state::AppState;

/// Create all API routes.
///
/// Public routes sit at the top. Routes that personalize their payload
/// for a logged-in caller (product detail, contact) run behind the
/// optional-auth layer; everything else that touches an account runs
/// behind the required-auth layer.
pub fn routes(state: &AppState) -> Router {
    let auth_state = AuthState {
        service: UserService::new(Arc::new(PostgresUserRepository::new(state.db.clone()))),
        jwt: state.jwt.clone(),
    };
    let catalog_state = CatalogState {
        service: CatalogService::new(Arc::new(PostgresCatalogRepository::new(state.db.clone()))),
    };
    let favorite_state = FavoriteState {
        service: FavoriteService::new(Arc::new(PostgresFavoriteRepository::new(state.db.clone()))),
    };
    let contact_state = ContactState {
        service: ContactService::new(Arc::new(PostgresContactRepository::new(state.db.clone()))),
    };

    let required_auth = from_fn_with_state(state.jwt.clone(), jwt_auth_middleware);
    let optional_auth = from_fn_with_state(state.jwt.clone(), optional_jwt_auth_middleware);

    let public = Router::new()
        .nest("/auth", domain_users::handlers::public_router(auth_state.clone()))
        .merge(domain_catalog::handlers::public_router(catalog_state.clone()));

    let optional = Router::new()
        .merge(domain_catalog::handlers::optional_auth_router(catalog_state.clone()))
        .merge(domain_contact::handlers::router(contact_state))
        .layer(optional_auth);

    let protected = Router::new()
        .nest("/auth", domain_users::handlers::protected_router(auth_state))
        .merge(domain_catalog::handlers::farmer_router(catalog_state))
        .merge(domain_favorites::handlers::router(favorite_state))
        .layer(required_auth);

    let ready = Router::new()
        .route("/ready", get(readiness))
        .with_state(state.clone());

    Router::new()
        .merge(public)
        .merge(optional)
        .merge(protected)
        .merge(ready)
}

/// Readiness probe checking both backing stores.
async fn readiness(State(state): State<AppState>) -> Response {
    let (db_ok, redis_ok) = tokio::join!(
        async { state.db.ping().await.is_ok() },
        database::redis::check_health(&state.redis),
    );

    let status = if db_ok && redis_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "success": db_ok && redis_ok,
            "postgres": db_ok,
            "redis": redis_ok,
        })),
    )
        .into_response()
}
