//! Shared helpers for the HTTP-level integration tests
//!
//! Every test drives the fully layered router (format normalization,
//! request tracking, CORS) over a fresh in-memory database.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use jobsys::config::ServiceConfig;
use jobsys::http_server::build_router;
use jobsys::rest_api::AppState;
use jobsys::store::SqliteJobStore;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers[name].to_str().unwrap()
    }
}

pub fn app() -> Router {
    app_with(SqliteJobStore::open_in_memory().unwrap())
}

pub fn app_with(store: SqliteJobStore) -> Router {
    build_router(&ServiceConfig::default(), AppState::new(store))
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    request(app, Method::GET, uri, &[], None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    request(app, Method::POST, uri, &[], Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> TestResponse {
    request(app, Method::PUT, uri, &[], Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, body: Value) -> TestResponse {
    request(app, Method::PATCH, uri, &[], Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    request(app, Method::DELETE, uri, &[], None).await
}

/// POST and assert 201, returning the created representation
pub async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let response = post(app, uri, body).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

/// Send a raw (possibly malformed) JSON body and return the status
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: &str) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}
