use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use room_relay::adapters::{app_router, RoomRouter, WebSocketState};
use room_relay::config::AppConfig;
use room_relay::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;

    telemetry::init(&config.server);

    let router = Arc::new(RoomRouter::new(config.server.channel_capacity));
    let app = app_router(WebSocketState::new(router), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, environment = ?config.server.environment, "Room relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Room relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
