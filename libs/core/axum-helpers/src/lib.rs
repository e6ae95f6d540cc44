//! # Axum Helpers
//!
//! Shared web infrastructure for the marketplace API:
//!
//! - **[`auth`]**: JWT authentication with a Redis-backed blacklist
//! - **[`envelope`]**: the uniform `{success, message, ...}` response wrapper
//! - **[`extractors`]**: validated JSON extraction
//! - **[`http`]**: CORS and security-header middleware
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown

pub mod auth;
pub mod envelope;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export auth types
pub use auth::{
    ACCESS_TOKEN_TTL, AuthUser, JwtAuth, JwtClaims, JwtConfig, REFRESH_TOKEN_TTL, RedisAuthStore,
    TokenPair, jwt_auth_middleware, optional_jwt_auth_middleware,
};

// Re-export envelope helpers
pub use envelope::{ErrorBody, ErrorCode, fail, fail_with_fields, not_found, ok_message};

// Re-export extractors
pub use extractors::ValidatedJson;

// Re-export server types
pub use server::{
    CleanupCoordinator, ShutdownCoordinator, create_app, create_production_app, create_router,
    health_router, shutdown_signal,
};
