use super::jwt::{AuthUser, JwtAuth};
use crate::envelope::{ErrorCode, fail};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Pull the bearer token out of the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
}

fn authentication_required() -> Response {
    fail(
        StatusCode::UNAUTHORIZED,
        ErrorCode::AuthenticationRequired,
        "Authentication credentials were not provided.",
    )
}

/// JWT authentication middleware for protected routes.
///
/// Requires a valid, non-revoked access token in the Authorization
/// header. On success an [`AuthUser`] is inserted into the request
/// extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = match extract_bearer_token(&headers) {
        Some(t) => t,
        None => {
            tracing::debug!("no bearer token in Authorization header");
            return Err(authentication_required());
        }
    };

    let claims = match auth.verify_token(&token) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("JWT verification failed: {}", e);
            return Err(authentication_required());
        }
    };

    if claims.token_type != "access" {
        tracing::debug!("token is not an access token");
        return Err(authentication_required());
    }

    match auth.is_token_blacklisted(&claims.jti).await {
        Ok(true) => {
            tracing::debug!("token has been revoked: {}", claims.jti);
            return Err(authentication_required());
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!("Redis error checking blacklist: {}", e);
            return Err(fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ServerError,
                "Service temporarily unavailable",
            ));
        }
    }

    let user = match AuthUser::try_from(&claims) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("token subject is not a valid user id: {}", e);
            return Err(authentication_required());
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Like [`jwt_auth_middleware`] but anonymous requests pass through.
///
/// Used by endpoints that enrich responses for authenticated callers,
/// e.g. `is_favorited` on product detail.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(&headers)
        && let Ok(claims) = auth.verify_token(&token)
        && claims.token_type == "access"
    {
        let revoked = auth.is_token_blacklisted(&claims.jti).await.unwrap_or(true);
        if !revoked && let Ok(user) = AuthUser::try_from(&claims) {
            request.extensions_mut().insert(user);
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn ignores_non_bearer_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
