//! Application state management

use axum_helpers::auth::JwtAuth;
use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: DatabaseConnection,
    pub redis: ConnectionManager,
    pub jwt: JwtAuth,
}
