use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{
    LoggingUserEventPublisher, NatsUserEventPublisher, PgUserRepository, UserEventPublisher,
    UserService,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migration failed: {}", e))?;

    // NATS is optional: without it lifecycle events are logged instead
    let nats_publisher = match config.events.url.as_deref() {
        Some(url) => {
            info!("Connecting to NATS at {}", url);
            match async_nats::connect(url).await {
                Ok(client) => {
                    info!("NATS connected successfully");
                    Some(NatsUserEventPublisher::new(client, config.events.topic.clone()))
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to NATS: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let publisher: Arc<dyn UserEventPublisher> = match nats_publisher.clone() {
        Some(publisher) => Arc::new(publisher),
        None => Arc::new(LoggingUserEventPublisher),
    };

    let service = UserService::new(PgUserRepository::new(db.clone()), publisher);

    // Build router with API routes; create_router adds docs/middleware
    let api_routes = api::routes(service);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health endpoints into the app
    // - /health: liveness check with app name/version
    // - /ready: readiness check with a live database ping
    let app = router
        .merge(health_router(config.app.clone()))
        .merge(api::ready_router(db.clone()));

    info!("Starting user API with production-ready shutdown (30s timeout)");

    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30), // 30s graceful shutdown timeout
        async move {
            info!("Shutting down: flushing events and closing database connections");

            if let Some(publisher) = nats_publisher {
                publisher.flush().await;
            }

            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("User API shutdown complete");
    Ok(())
}
