//! Marketplace API - REST server

use std::time::Duration;

use axum_helpers::auth::JwtAuth;
use axum_helpers::server::{cleanup, create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");
    let db = database::postgres::connect_from_config_with_retry(config.postgres.clone(), None)
        .await?;

    info!("Connecting to Redis");
    let redis =
        database::redis::connect_from_config_with_retry(config.redis.clone(), None).await?;

    if config.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    }

    let jwt = JwtAuth::new(redis.clone(), &config.jwt);

    let state = AppState {
        config: config.clone(),
        db,
        redis,
        jwt,
    };

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;
    let app = router.merge(health_router(state.config.app.clone()));

    info!("Starting Marketplace API on port {}", state.config.server.port);

    create_production_app(app, &state.config.server, Duration::from_secs(30), async move {
        cleanup::close_postgres(state.db, "marketplace").await;
        cleanup::close_redis(state.redis, "marketplace").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Marketplace API shutdown complete");
    Ok(())
}
