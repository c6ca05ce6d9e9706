use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use wedding_site_api::app::{build_router, AppState};
use wedding_site_api::backends::Stores;
use wedding_site_api::config::{Config, StorageBackend};
use wedding_site_api::jobs::{JobScheduler, PoolMetricsJob, RateLimitPruneJob};
use wedding_site_api::middleware::{init_metrics, logging::init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;

    init_logging(&config.logging).context("failed to initialize logging")?;
    init_metrics().context("failed to install metrics recorder")?;

    info!("Starting Wedding Site API v{}", env!("CARGO_PKG_VERSION"));

    let stores = match config.storage.backend {
        StorageBackend::Postgres => {
            let db_config = persistence::db::DatabaseConfig::from(&config.database);
            let pool = persistence::db::create_pool(&db_config).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            Stores::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            Stores::memory()
        }
    };
    info!(backend = stores.backend_name(), "Stores ready");

    let addr = config.socket_addr()?;
    let state = AppState::new(config, stores)?;

    let mut scheduler = JobScheduler::new();
    if let Some(pool) = &state.pool {
        scheduler.register(PoolMetricsJob::new(pool.clone()));
    }
    if let Some(limiter) = &state.rate_limiter {
        scheduler.register(RateLimitPruneJob::new(Arc::clone(limiter)));
    }
    scheduler.start();

    let app = build_router(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
