//! JWT authentication with a Redis-backed blacklist.
//!
//! Access and refresh tokens are stateless HS256 JWTs; logout revokes a
//! refresh token by blacklisting its `jti` in Redis for the remainder of
//! its lifetime.
//!
//! ```ignore
//! let config = JwtConfig::from_env()?;
//! let auth = JwtAuth::new(redis_manager, &config);
//!
//! let protected = Router::new()
//!     .route("/products", post(create_product))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod store;

pub use config::JwtConfig;
pub use jwt::{ACCESS_TOKEN_TTL, AuthUser, JwtAuth, JwtClaims, REFRESH_TOKEN_TTL, TokenPair};
pub use middleware::{jwt_auth_middleware, optional_jwt_auth_middleware};
pub use store::RedisAuthStore;
