//! Job Resource Tests
//!
//! Black-box tests of `/jobs/` and `/jobs/{id}/` through the full router:
//! - Create / list / retrieve / update / delete
//! - Filters and ordering on the list
//! - Conditional requests on the detail resource
//! - Trailing slash and format suffix handling

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{app, create, get, ids, post, request};

async fn create_job(app: &Router, body: Value) -> Value {
    create(app, "/jobs/", body).await
}

// =============================================================================
// CRUD
// =============================================================================

/// A created job carries defaults, read-only names and timestamps.
#[tokio::test]
async fn test_create_job_applies_defaults() {
    let app = app();

    let job = create_job(&app, json!({"name": "reindex", "type": 4})).await;

    assert_eq!(job["name"], "reindex");
    assert_eq!(job["type"], 4);
    assert_eq!(job["type_name"], "Maintenance");
    assert_eq!(job["status"], 0);
    assert_eq!(job["status_name"], "Queued");
    assert_eq!(job["progress"], 0);
    assert_eq!(job["namespace"], "");
    assert_eq!(job["template"], Value::Null);
    assert_eq!(job["date_created"], job["date_modified"]);
}

/// Data written equals data read back.
#[tokio::test]
async fn test_job_round_trip() {
    let app = app();
    let created = create_job(
        &app,
        json!({
            "namespace": "billing",
            "name": "invoice run",
            "type": 2,
            "status": 1,
            "progress": 35,
            "owner": "dana"
        }),
    )
    .await;

    let detail = get(&app, &format!("/jobs/{}/", created["id"])).await;
    assert_eq!(detail.status, StatusCode::OK);
    for field in [
        "id", "namespace", "name", "type", "status", "progress", "owner", "date_created",
        "date_modified",
    ] {
        assert_eq!(detail.body[field], created[field], "field {}", field);
    }
    assert_eq!(detail.body["parameters"], json!([]));
    assert_eq!(detail.body["logs"], json!([]));
}

/// Missing and out-of-range fields are reported per field.
#[tokio::test]
async fn test_create_job_validation() {
    let app = app();

    let response = post(&app, "/jobs/", json!({"type": 0})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], 400);
    assert_eq!(response.body["fields"]["name"][0], "This field is required.");

    let response = post(&app, "/jobs/", json!({"name": "x", "type": 42})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["fields"]["type"].is_array());

    let response = post(&app, "/jobs/", json!({"name": "x", "type": 0, "progress": 150})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["fields"]["progress"].is_array());

    let response = post(&app, "/jobs/", json!({"name": "x", "template": 77})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["fields"]["template"][0],
        "Invalid pk \"77\" - object does not exist."
    );
}

/// Malformed JSON is a 400, not a 422.
#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/jobs/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_and_patch() {
    let app = app();
    let job = create_job(&app, json!({"name": "sync", "type": 1, "owner": "eve"})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let put = request(
        &app,
        Method::PUT,
        &uri,
        &[],
        Some(json!({"name": "sync v2", "type": 1, "status": 1})),
    )
    .await;
    assert_eq!(put.status, StatusCode::OK);
    assert_eq!(put.body["name"], "sync v2");
    assert_eq!(put.body["status_name"], "Running");
    // PUT replaces: owner falls back to its default
    assert_eq!(put.body["owner"], "");
    assert_eq!(put.body["date_created"], job["date_created"]);

    let patch = request(&app, Method::PATCH, &uri, &[], Some(json!({"progress": 80}))).await;
    assert_eq!(patch.status, StatusCode::OK);
    assert_eq!(patch.body["progress"], 80);
    assert_eq!(patch.body["name"], "sync v2");

    let bad = request(&app, Method::PATCH, &uri, &[], Some(json!({"status": 12}))).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_job() {
    let app = app();
    let job = create_job(&app, json!({"name": "tmp", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let response = request(&app, Method::DELETE, &uri, &[], None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        request(&app, Method::DELETE, &uri, &[], None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_unknown_or_malformed_id_is_not_found() {
    let app = app();
    assert_eq!(get(&app, "/jobs/999/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/jobs/abc/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/nothing-here/").await.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Filters
// =============================================================================

async fn seed(app: &Router) -> (i64, i64, i64) {
    let a = create_job(app, json!({"name": "a", "type": 1, "status": 2, "owner": "ann"})).await;
    let b = create_job(app, json!({"name": "b", "type": 2, "status": 0, "owner": "bob"})).await;
    let c = create_job(app, json!({"name": "c", "type": 1, "status": 3, "owner": "bob"})).await;
    (
        a["id"].as_i64().unwrap(),
        b["id"].as_i64().unwrap(),
        c["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn test_filter_by_type_and_status() {
    let app = app();
    let (a, b, c) = seed(&app).await;

    let mut by_type = ids(&get(&app, "/jobs/?type=1").await.body);
    by_type.sort();
    assert_eq!(by_type, vec![a, c]);

    assert_eq!(ids(&get(&app, "/jobs/?status=0").await.body), vec![b]);
    assert_eq!(ids(&get(&app, "/jobs/?type=1&status=3").await.body), vec![c]);
    assert_eq!(ids(&get(&app, "/jobs/?owner=ann").await.body), vec![a]);
}

#[tokio::test]
async fn test_filter_by_type_name() {
    let app = app();
    let (_, b, _) = seed(&app).await;

    assert_eq!(ids(&get(&app, "/jobs/?type_name=Export").await.body), vec![b]);

    let unknown = get(&app, "/jobs/?type_name=Bogus").await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(unknown.body, json!([]));
}

#[tokio::test]
async fn test_filter_invalid_choice_is_bad_request() {
    let app = app();
    seed(&app).await;

    assert_eq!(get(&app, "/jobs/?status=9").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/jobs/?type=x").await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_filter_days_since_creation() {
    let app = app();
    seed(&app).await;

    assert_eq!(ids(&get(&app, "/jobs/?days_since_creation=0").await.body).len(), 3);
    // Non-integral values do not filter
    assert_eq!(ids(&get(&app, "/jobs/?days_since_creation=1.5").await.body).len(), 3);
    assert_eq!(
        get(&app, "/jobs/?days_since_creation=abc").await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_empty_and_unknown_params_ignored() {
    let app = app();
    seed(&app).await;

    assert_eq!(ids(&get(&app, "/jobs/?status=&colour=red").await.body).len(), 3);
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_default_ordering_newest_first() {
    let app = app();
    let (a, b, c) = seed(&app).await;

    assert_eq!(ids(&get(&app, "/jobs/").await.body), vec![c, b, a]);
}

#[tokio::test]
async fn test_ordering_by_fields() {
    let app = app();
    let (a, b, c) = seed(&app).await;

    assert_eq!(ids(&get(&app, "/jobs/?ordering=status").await.body), vec![b, a, c]);
    assert_eq!(ids(&get(&app, "/jobs/?ordering=-status").await.body), vec![c, a, b]);
    assert_eq!(
        ids(&get(&app, "/jobs/?ordering=type,-status").await.body),
        vec![c, a, b]
    );
    assert_eq!(
        ids(&get(&app, "/jobs/?ordering=date_created").await.body),
        vec![a, b, c]
    );
}

#[tokio::test]
async fn test_unknown_ordering_uses_default() {
    let app = app();
    let (a, b, c) = seed(&app).await;

    assert_eq!(ids(&get(&app, "/jobs/?ordering=owner").await.body), vec![c, b, a]);
}

// =============================================================================
// Conditional Requests
// =============================================================================

#[tokio::test]
async fn test_get_sets_validators() {
    let app = app();
    let job = create_job(&app, json!({"name": "c", "type": 0})).await;

    let response = get(&app, &format!("/jobs/{}/", job["id"])).await;
    let etag = response.header(header::ETAG);
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert!(response.header(header::LAST_MODIFIED).ends_with(" GMT"));
}

#[tokio::test]
async fn test_if_none_match_returns_not_modified() {
    let app = app();
    let job = create_job(&app, json!({"name": "c", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let first = get(&app, &uri).await;
    let etag = first.header(header::ETAG).to_string();

    let second = request(&app, Method::GET, &uri, &[("if-none-match", etag.as_str())], None).await;
    assert_eq!(second.status, StatusCode::NOT_MODIFIED);
    assert_eq!(second.body, Value::Null);
    assert_eq!(second.header(header::ETAG), etag);

    let head = request(&app, Method::HEAD, &uri, &[("if-none-match", etag.as_str())], None).await;
    assert_eq!(head.status, StatusCode::NOT_MODIFIED);

    let stale = request(&app, Method::GET, &uri, &[("if-none-match", "\"stale\"")], None).await;
    assert_eq!(stale.status, StatusCode::OK);
}

#[tokio::test]
async fn test_if_modified_since_returns_not_modified() {
    let app = app();
    let job = create_job(&app, json!({"name": "c", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let first = get(&app, &uri).await;
    let last_modified = first.header(header::LAST_MODIFIED).to_string();

    let second = request(
        &app,
        Method::GET,
        &uri,
        &[("if-modified-since", last_modified.as_str())],
        None,
    )
    .await;
    assert_eq!(second.status, StatusCode::NOT_MODIFIED);

    let older = request(
        &app,
        Method::GET,
        &uri,
        &[("if-modified-since", "Sat, 01 Jan 2000 00:00:00 GMT")],
        None,
    )
    .await;
    assert_eq!(older.status, StatusCode::OK);

    let garbage = request(&app, Method::GET, &uri, &[("if-modified-since", "soon")], None).await;
    assert_eq!(garbage.status, StatusCode::OK);
}

#[tokio::test]
async fn test_put_with_stale_if_match_fails() {
    let app = app();
    let job = create_job(&app, json!({"name": "before", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let response = request(
        &app,
        Method::PUT,
        &uri,
        &[("if-match", "\"stale\"")],
        Some(json!({"name": "after", "type": 0})),
    )
    .await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(response.body["code"], 412);

    assert_eq!(get(&app, &uri).await.body["name"], "before");
}

#[tokio::test]
async fn test_put_with_current_if_match_succeeds() {
    let app = app();
    let job = create_job(&app, json!({"name": "before", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);
    let etag = get(&app, &uri).await.header(header::ETAG).to_string();

    let response = request(
        &app,
        Method::PUT,
        &uri,
        &[("if-match", etag.as_str())],
        Some(json!({"name": "after", "type": 0})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "after");
    assert_ne!(response.header(header::ETAG), etag);
}

#[tokio::test]
async fn test_put_with_matching_if_none_match_fails() {
    let app = app();
    let job = create_job(&app, json!({"name": "n", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let response = request(
        &app,
        Method::PUT,
        &uri,
        &[("if-none-match", "*")],
        Some(json!({"name": "m", "type": 0})),
    )
    .await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_patch_honours_if_unmodified_since() {
    let app = app();
    let job = create_job(&app, json!({"name": "n", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let response = request(
        &app,
        Method::PATCH,
        &uri,
        &[("if-unmodified-since", "Sat, 01 Jan 2000 00:00:00 GMT")],
        Some(json!({"progress": 10})),
    )
    .await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_conditional_on_missing_job_is_not_found() {
    let app = app();
    let response = request(
        &app,
        Method::PUT,
        "/jobs/404/",
        &[("if-match", "\"x\"")],
        Some(json!({"name": "m", "type": 0})),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

/// An unquoted If-Match value can never match, so the write is refused.
#[tokio::test]
async fn test_put_with_malformed_if_match_fails() {
    let app = app();
    let job = create_job(&app, json!({"name": "before", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let response = request(
        &app,
        Method::PUT,
        &uri,
        &[("if-match", "stale-unquoted")],
        Some(json!({"name": "after", "type": 0})),
    )
    .await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(get(&app, &uri).await.body["name"], "before");
}

/// A malformed If-None-Match still suppresses If-Modified-Since.
#[tokio::test]
async fn test_malformed_if_none_match_serves_full_body() {
    let app = app();
    let job = create_job(&app, json!({"name": "n", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);
    let last_modified = get(&app, &uri).await.header(header::LAST_MODIFIED).to_string();

    let response = request(
        &app,
        Method::GET,
        &uri,
        &[
            ("if-none-match", "not-a-tag"),
            ("if-modified-since", last_modified.as_str()),
        ],
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "n");
}

/// The entity tag covers nested parameters and logs, not just the job row.
#[tokio::test]
async fn test_etag_changes_with_children() {
    let app = app();
    let job = create_job(&app, json!({"name": "c", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);
    let before = get(&app, &uri).await.header(header::ETAG).to_string();

    post(
        &app,
        &format!("/jobs/{}/parameters/", job["id"]),
        json!({"key": "k", "value": "v"}),
    )
    .await;

    let response = request(
        &app,
        Method::GET,
        &uri,
        &[("if-none-match", before.as_str())],
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["parameters"][0]["key"], "k");
    assert_ne!(response.header(header::ETAG), before);

    post(&app, &format!("/jobs/{}/logs/", job["id"]), json!({"message": "m"})).await;
    let stale = request(
        &app,
        Method::PUT,
        &uri,
        &[("if-match", response.header(header::ETAG))],
        Some(json!({"name": "c2", "type": 0})),
    )
    .await;
    assert_eq!(stale.status, StatusCode::PRECONDITION_FAILED);
}

/// The returned ETag validates a follow-up conditional GET.
#[tokio::test]
async fn test_put_etag_matches_next_get() {
    let app = app();
    let job = create_job(&app, json!({"name": "a", "type": 0})).await;
    let uri = format!("/jobs/{}/", job["id"]);

    let put = request(&app, Method::PUT, &uri, &[], Some(json!({"name": "b", "type": 0}))).await;
    let etag = put.header(header::ETAG).to_string();

    let response = request(&app, Method::GET, &uri, &[("if-none-match", etag.as_str())], None).await;
    assert_eq!(response.status, StatusCode::NOT_MODIFIED);
}

/// The target is looked up before the body is parsed.
#[tokio::test]
async fn test_malformed_body_to_missing_job_is_not_found() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/jobs/404/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// URL Forms
// =============================================================================

#[tokio::test]
async fn test_trailing_slash_and_suffix_equivalence() {
    let app = app();
    let job = create_job(&app, json!({"name": "s", "type": 0})).await;
    let id = job["id"].as_i64().unwrap();

    let canonical = get(&app, &format!("/jobs/{}/", id)).await.body;
    for uri in [
        format!("/jobs/{}", id),
        format!("/jobs/{}.json", id),
        format!("/jobs/{}/?format=json", id),
    ] {
        let response = get(&app, &uri).await;
        assert_eq!(response.status, StatusCode::OK, "{}", uri);
        assert_eq!(response.body, canonical, "{}", uri);
    }

    assert_eq!(get(&app, "/jobs").await.body, get(&app, "/jobs.json").await.body);
}

#[tokio::test]
async fn test_unsupported_format_is_not_found() {
    let app = app();
    assert_eq!(get(&app, "/jobs.xml").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/jobs/?format=api").await.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Operational Endpoints
// =============================================================================

#[tokio::test]
async fn test_request_id_and_metrics() {
    let app = app();
    let created = post(&app, "/jobs/", json!({"name": "m", "type": 0})).await;
    assert!(created.headers.contains_key("x-request-id"));

    get(&app, "/jobs/999/").await;

    let metrics = get(&app, "/metrics").await;
    assert_eq!(metrics.status, StatusCode::OK);
    assert_eq!(metrics.body["jobs_created"], 1);
    assert_eq!(metrics.body["client_errors"], 1);
    assert_eq!(metrics.body["requests_served"], 2);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = get(&app, "/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}
