//! Liveness endpoint reporting relay occupancy.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::adapters::websocket::WebSocketState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
    pub rooms: usize,
}

/// `GET /health`
pub async fn health(State(state): State<WebSocketState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: state.router.connection_count().await,
        rooms: state.router.active_rooms().await.len(),
    })
}
