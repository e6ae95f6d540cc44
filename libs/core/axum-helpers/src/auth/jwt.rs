use super::config::JwtConfig;
use super::store::RedisAuthStore;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT token time-to-live constants
pub const ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes
pub const REFRESH_TOKEN_TTL: i64 = 604800; // 7 days

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub email: String,      // User email
    pub user_type: String,  // "farmer" or "horeca"
    pub token_type: String, // "access" or "refresh"
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID (for the blacklist)
}

/// Authenticated caller identity, inserted into request extensions by
/// the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub user_type: String,
}

impl TryFrom<&JwtClaims> for AuthUser {
    type Error = uuid::Error;

    fn try_from(claims: &JwtClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&claims.sub)?,
            email: claims.email.clone(),
            user_type: claims.user_type.clone(),
        })
    }
}

/// An access/refresh token pair issued on registration and login.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Stateless JWT auth with a Redis-backed revocation blacklist.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    store: RedisAuthStore,
}

impl JwtAuth {
    pub fn new(manager: ConnectionManager, config: &JwtConfig) -> Self {
        let store = RedisAuthStore::new(manager);
        tracing::info!("JWT auth initialized");
        Self {
            secret: config.secret.clone(),
            store,
        }
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn create_token_pair(
        &self,
        user_id: &str,
        email: &str,
        user_type: &str,
    ) -> eyre::Result<TokenPair> {
        Ok(TokenPair {
            access: sign_token(
                &self.secret,
                user_id,
                email,
                user_type,
                "access",
                ACCESS_TOKEN_TTL,
            )?,
            refresh: sign_token(
                &self.secret,
                user_id,
                email,
                user_type,
                "refresh",
                REFRESH_TOKEN_TTL,
            )?,
        })
    }

    /// Verify the signature and expiry, returning the decoded claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        verify_token(&self.secret, token)
    }

    /// Check whether a token id has been revoked.
    pub async fn is_token_blacklisted(&self, jti: &str) -> eyre::Result<bool> {
        let mut store = self.store.clone();
        store
            .check_jwt_blacklist(jti)
            .await
            .map_err(|e| eyre::eyre!("failed to check blacklist: {}", e))
    }

    /// Revoke a refresh token by blacklisting its `jti` for the rest of
    /// its lifetime. Fails if the token is not a valid refresh token.
    pub async fn revoke_refresh_token(&self, token: &str) -> eyre::Result<()> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "refresh" {
            eyre::bail!("not a refresh token");
        }

        let remaining = (claims.exp - Utc::now().timestamp()).max(1) as u64;
        let mut store = self.store.clone();
        store
            .blacklist_jwt(&claims.jti, remaining)
            .await
            .map_err(|e| eyre::eyre!("failed to blacklist token: {}", e))?;

        Ok(())
    }
}

fn sign_token(
    secret: &str,
    user_id: &str,
    email: &str,
    user_type: &str,
    token_type: &str,
    ttl_seconds: i64,
) -> eyre::Result<String> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        user_type: user_type.to_string(),
        token_type: token_type.to_string(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let header = Header {
        alg: jsonwebtoken::Algorithm::HS256,
        ..Default::default()
    };

    let token = encode(
        &header,
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn verify_token(secret: &str, token: &str) -> eyre::Result<JwtClaims> {
    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}
