use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use axum_helpers::auth::{AuthUser, JwtAuth, TokenPair};
use axum_helpers::envelope::ErrorCode;
use axum_helpers::extractors::ValidatedJson;
use serde_json::json;
use utoipa::OpenApi;

use crate::error::UserError;
use crate::models::{
    ChangePasswordRequest, LoginRequest, LogoutRequest, RegisterRequest, UpdateProfileRequest,
    UserProfile, UserType,
};
use crate::postgres::PostgresUserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the auth endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        register_farmer,
        register_horeca,
        login,
        logout,
        get_profile,
        update_profile,
        change_password,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LogoutRequest,
        UpdateProfileRequest,
        ChangePasswordRequest,
        UserProfile,
        UserType,
        TokenPair,
    )),
    tags(
        (name = "auth", description = "Registration, login and profile management")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AuthState {
    pub service: UserService<PostgresUserRepository>,
    pub jwt: JwtAuth,
}

/// Routes under `/api/auth`. Protected routes get the JWT middleware
/// layered on by the composing application.
pub fn public_router(state: AuthState) -> Router {
    Router::new()
        .route("/farmer/register", post(register_farmer))
        .route("/horeca/register", post(register_horeca))
        .route("/login", post(login))
        .with_state(state)
}

pub fn protected_router(state: AuthState) -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
        .with_state(state)
}

async fn register(
    state: &AuthState,
    request: RegisterRequest,
    user_type: UserType,
) -> Result<(UserProfile, TokenPair), UserError> {
    let user = state.service.register(request, user_type).await?;
    let tokens = state
        .jwt
        .create_token_pair(&user.id.to_string(), &user.email, user.user_type.as_str())
        .map_err(|e| UserError::Internal(format!("token issuance failed: {e}")))?;
    Ok((user.into(), tokens))
}

fn registration_response(message: &str, profile: UserProfile, tokens: TokenPair) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": message,
            "user": profile,
            "tokens": tokens,
        })),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/farmer/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Farmer account created"),
        (status = 400, description = "Validation failed"),
    ),
    tag = "auth"
)]
pub async fn register_farmer(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Response {
    match register(&state, request, UserType::Farmer).await {
        Ok((profile, tokens)) => {
            registration_response("Farmer registered successfully", profile, tokens)
        }
        Err(err) => err.respond(
            ErrorCode::ServerError,
            "Registration failed due to a server error. Please try again later.",
        ),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/horeca/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "HoReCa account created"),
        (status = 400, description = "Validation failed"),
    ),
    tag = "auth"
)]
pub async fn register_horeca(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Response {
    match register(&state, request, UserType::Horeca).await {
        Ok((profile, tokens)) => {
            registration_response("HoReCa registered successfully", profile, tokens)
        }
        Err(err) => err.respond(
            ErrorCode::ServerError,
            "Registration failed due to a server error. Please try again later.",
        ),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Response {
    let user = match state.service.authenticate(&request.email, &request.password).await {
        Ok(user) => user,
        Err(err) => {
            return err.respond(
                ErrorCode::ServerError,
                "Login failed due to a server error. Please try again later.",
            );
        }
    };
    let tokens = match state
        .jwt
        .create_token_pair(&user.id.to_string(), &user.email, user.user_type.as_str())
    {
        Ok(tokens) => tokens,
        Err(e) => {
            return UserError::Internal(format!("token issuance failed: {e}")).respond(
                ErrorCode::ServerError,
                "Login failed due to a server error. Please try again later.",
            );
        }
    };
    Json(json!({
        "success": true,
        "message": "Login successful",
        "user": UserProfile::from(user),
        "tokens": tokens,
    }))
    .into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out"),
        (status = 400, description = "Refresh token missing"),
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AuthState>,
    Json(request): Json<LogoutRequest>,
) -> Response {
    let Some(refresh_token) = request.refresh_token else {
        return UserError::MissingToken.into_response();
    };
    logout_response(state.jwt.revoke_refresh_token(&refresh_token).await)
}

// An already revoked or malformed token still reports success.
fn logout_response(revocation: eyre::Result<()>) -> Response {
    match revocation {
        Ok(()) => Json(json!({"success": true, "message": "Logout successful"})).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "refresh token revocation failed");
            Json(json!({"success": true, "message": "Logout completed successfully"}))
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current profile", body = UserProfile),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AuthState>,
    Extension(auth): Extension<AuthUser>,
) -> Response {
    match state.service.get_profile(auth.id).await {
        Ok(user) => {
            Json(json!({"success": true, "user": UserProfile::from(user)})).into_response()
        }
        Err(err) => err.respond(
            ErrorCode::ProfileError,
            "Unable to retrieve profile information.",
        ),
    }
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Validation failed"),
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AuthState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Response {
    match state.service.update_profile(auth.id, request).await {
        Ok(user) => Json(json!({
            "success": true,
            "message": "Profile updated successfully",
            "user": UserProfile::from(user),
        }))
        .into_response(),
        Err(err) => err.respond(
            ErrorCode::UpdateError,
            "Profile update failed due to a server error.",
        ),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation failed"),
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AuthState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Response {
    match state.service.change_password(auth.id, request).await {
        Ok(()) => {
            Json(json!({"success": true, "message": "Password changed successfully"}))
                .into_response()
        }
        Err(err) => err.respond(
            ErrorCode::PasswordError,
            "Password change failed due to a server error.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn logout_reports_success_on_revocation() {
        let response = logout_response(Ok(()));
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(body["message"], serde_json::json!("Logout successful"));
    }

    #[tokio::test]
    async fn logout_swallows_malformed_token_errors() {
        let response = logout_response(Err(eyre::eyre!(
            "token contains an invalid number of segments"
        )));
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(
            body["message"],
            serde_json::json!("Logout completed successfully")
        );
    }
}
