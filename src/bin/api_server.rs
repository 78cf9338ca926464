// src/bin/api_server.rs

use anyhow::Context;
use bookpulse::infra::telemetry::{init_logging, shutdown_signal};
use bookpulse::storage::schema;
use bookpulse::transport::http::{build_app, AppState};
use bookpulse::{Config, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_logging(config.log_format);

    tracing::info!(max_connections = config.store.max_connections, "connecting to database");
    let store = Store::connect(&config.store)
        .await
        .context("database connection failed")?;
    schema::apply(store.pool()).await.context("schema setup failed")?;

    let app_state = AppState::from_config(&config, store.clone())?;
    let app = build_app(app_state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "API server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.pool().close().await;
    tracing::info!("shutdown complete");
    Ok(())
}
