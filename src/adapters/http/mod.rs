//! HTTP adapters - application router assembly.
//!
//! Mounts the relay WebSocket endpoint and the health check, and wraps them
//! in request tracing and CORS.

pub mod health;

use axum::{routing::get, Router};
use ::http::HeaderValue;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::config::ServerConfig;

pub use health::{health, HealthResponse};

/// Build the complete application router.
///
/// # Routes
/// - `GET /`, `GET /ws` - WebSocket upgrade into the relay
/// - `GET /health` - Liveness and occupancy counts
pub fn app_router(state: WebSocketState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(websocket_router())
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy from the configured origins; permissive when none are set.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(origins)
    }
}
