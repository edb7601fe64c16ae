//! Request tracking middleware
//!
//! Tags every response with an `X-Request-Id`, records it in the metrics
//! registry and logs one line per request.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub async fn track_requests(
    State(metrics): State<Arc<MetricsRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    metrics.record_response(status);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let event = if status >= 500 {
        Event::RequestFailed
    } else {
        Event::RequestComplete
    };
    log_event_with_fields(
        event,
        &[
            ("request_id", &request_id),
            ("method", &method),
            ("path", &path),
            ("status", &status.to_string()),
            ("latency_ms", &started.elapsed().as_millis().to_string()),
        ],
    );

    response
}
