//! Liveness, status and metrics endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use cosign_types::api::{HealthResponse, StatusResponse};
use std::sync::Arc;
use tracing::error;

use crate::AppState;

pub const SERVICE_NAME: &str = "cosign";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check handler
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
    })
}

/// Status handler with store occupancy
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let summary = state.store.summary().await;
    Json(StatusResponse {
        status: "running".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        open: summary.open,
        executed: summary.executed,
    })
}

/// Prometheus text exposition
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.encode_to_string() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, cosign_telemetry::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.service, "cosign");
        assert_eq!(response.version, VERSION);
    }
}
