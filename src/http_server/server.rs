//! # HTTP Server
//!
//! Combines the REST resources with the health/metrics routes, wraps
//! them in request tracking, CORS and URL normalization, and serves the
//! result on a tokio listener.

use std::sync::Arc;

use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::middleware::track_requests;
use super::observability_routes::observability_routes;
use crate::config::ServiceConfig;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::rest_api::{self, normalize_request, AppState};
use crate::store::JobStore;

/// HTTP server for the job API
pub struct HttpServer {
    config: ServiceConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over the given state
    pub fn new<S: JobStore + 'static>(config: ServiceConfig, state: AppState<S>) -> Self {
        let router = build_router(&config, state);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let local = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", &local)]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

/// Build the complete application router
///
/// URL normalization runs before routing: the resource router sits
/// behind a fallback so the rewritten URI is the one it matches on.
pub fn build_router<S: JobStore + 'static>(config: &ServiceConfig, state: AppState<S>) -> Router {
    let metrics = Arc::clone(&state.metrics);
    let api = rest_api::router(state).merge(observability_routes(Arc::clone(&metrics)));

    Router::new().fallback_service(api).layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(metrics, track_requests))
            .layer(cors_layer(&config.cors_origins))
            .layer(middleware::from_fn(normalize_request)),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // No origins configured: permissive
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|s| s.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; keep serving
        std::future::pending::<()>().await;
    }
    log_event(Event::ShutdownStart);
}
