//! ladder-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::time::Duration;

use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ladder_gateway::api;
use ladder_gateway::app_state::AppState;
use ladder_gateway::config::{LadderConfig, LogFormat};
use ladder_gateway::domain::EventBus;
use ladder_gateway::persistence::PostgresPersistence;
use ladder_gateway::service::LadderService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = LadderConfig::from_env()?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting ladder-gateway");

    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer, hydrated from storage when enabled
    let ladder_service = if config.persistence_enabled {
        let store = PostgresPersistence::connect(&config).await?;
        store.run_migrations().await?;
        LadderService::load(store, event_bus).await?
    } else {
        tracing::warn!("persistence disabled, ladder lives in memory only");
        LadderService::new(event_bus)
    };

    if ladder_service.validate().await.is_err() {
        tracing::warn!("POST /api/v1/roster/renumber repairs the roster once reviewed");
    }

    let app_state = AppState::new(ladder_service);

    // Build router
    let app = api::build_app(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.request_timeout_secs),
            ))
            .layer(CorsLayer::permissive()),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to listen for ctrl-c, shutting down");
    }
}
