//! Observability HTTP Routes
//!
//! Health check and metrics endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::observability::{MetricsRegistry, MetricsSnapshot};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create observability routes
pub fn observability_routes(metrics: Arc<MetricsRegistry>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Metrics handler - returns the current counters
async fn metrics_handler(State(metrics): State<Arc<MetricsRegistry>>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ok"));
    }
}
