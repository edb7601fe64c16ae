//! # URL Normalization
//!
//! Every resource answers with or without a trailing slash and with an
//! optional `.json` suffix or `?format=json`. The request URI is
//! rewritten before routing so the routes only ever see the bare path.

use axum::extract::Request;
use axum::http::uri::{PathAndQuery, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::errors::{RestError, RestResult};

/// The only representation served
pub const JSON_FORMAT: &str = "json";

/// Rewrite `path?query` into its canonical form
///
/// Strips one trailing slash and a `.json` suffix on the last segment.
/// Any other suffix or `format` query value is unsupported.
pub fn normalize(path_and_query: &str) -> RestResult<String> {
    let (path, query) = match path_and_query.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_and_query, None),
    };

    let mut path = path;
    if path.len() > 1 {
        path = path.strip_suffix('/').unwrap_or(path);
    }

    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let mut canonical = path.to_string();
    if let Some(dot) = path[segment_start..].rfind('.') {
        let suffix = &path[segment_start + dot + 1..];
        if suffix != JSON_FORMAT {
            return Err(RestError::UnsupportedFormat(suffix.to_string()));
        }
        canonical.truncate(segment_start + dot);
    }

    if let Some(query) = query {
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == "format" && !value.is_empty() && value != JSON_FORMAT {
                return Err(RestError::UnsupportedFormat(value.to_string()));
            }
        }
        if !query.is_empty() {
            canonical.push('?');
            canonical.push_str(query);
        }
    }

    Ok(canonical)
}

/// Middleware applying [`normalize`] to the request URI
pub async fn normalize_request(mut req: Request, next: Next) -> Response {
    let original = req
        .uri()
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");

    let rewritten = match normalize(original) {
        Ok(rewritten) => rewritten,
        Err(err) => return err.into_response(),
    };

    if rewritten != original {
        let mut parts = req.uri().clone().into_parts();
        parts.path_and_query = match rewritten.parse::<PathAndQuery>() {
            Ok(pq) => Some(pq),
            Err(_) => return RestError::NotFound.into_response(),
        };
        match Uri::from_parts(parts) {
            Ok(uri) => *req.uri_mut() = uri,
            Err(_) => return RestError::NotFound.into_response(),
        }
    }

    next.run(req).await
}
