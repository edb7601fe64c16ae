//! `/jobs/` handlers
//!
//! The detail resource honours conditional requests on GET/HEAD, PUT and
//! PATCH. Preconditions are checked against the stored representation
//! (job plus parameters and logs) before any update runs.

use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;

use super::conditional::{Precondition, Validators};
use super::errors::{RestError, RestResult};
use super::parser::ListQuery;
use super::server::AppState;
use crate::model::{Job, JobDetails, JobInput, JobPatch, NewJob};
use crate::store::JobStore;

pub(super) async fn list_jobs<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Job>>> {
    let ListQuery { filter, ordering } = ListQuery::parse(&params, Utc::now())?;
    let jobs = state
        .with_store(move |store| store.list_jobs(&filter, &ordering))
        .await?;
    Ok(Json(jobs))
}

pub(super) async fn create_job<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<JobInput>, JsonRejection>,
) -> RestResult<(StatusCode, Json<Job>)> {
    let Json(input) = payload?;
    let job = input.validate()?;
    let created = state
        .with_store(move |store| store.create_job(job, Utc::now()))
        .await?;
    state.metrics.increment_jobs_created();
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_job<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    method: Method,
    headers: HeaderMap,
) -> RestResult<Response> {
    let Path(id) = path?;
    let details = state.with_store(move |store| store.job_details(id)).await?;
    let validators = Validators::for_details(&details)?;

    match validators.evaluate(&method, &headers) {
        Precondition::Proceed => {}
        Precondition::NotModified => return Ok(validators.not_modified()),
        Precondition::Failed => return Err(RestError::PreconditionFailed),
    }

    let mut response = Json(details).into_response();
    validators.apply(response.headers_mut());
    Ok(response)
}

pub(super) async fn update_job<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    method: Method,
    headers: HeaderMap,
    payload: Result<Json<JobInput>, JsonRejection>,
) -> RestResult<Response> {
    let Path(id) = path?;
    let current = state.with_store(move |store| store.job_details(id)).await?;
    check_preconditions(&current, &method, &headers)?;
    let Json(input) = payload?;
    write_job(&state, id, input.validate()?).await
}

pub(super) async fn patch_job<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    method: Method,
    headers: HeaderMap,
    payload: Result<Json<JobPatch>, JsonRejection>,
) -> RestResult<Response> {
    let Path(id) = path?;
    let current = state.with_store(move |store| store.job_details(id)).await?;
    check_preconditions(&current, &method, &headers)?;
    let Json(patch) = payload?;
    write_job(&state, id, patch.merge(&current.job).validate()?).await
}

pub(super) async fn delete_job<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> RestResult<StatusCode> {
    let Path(id) = path?;
    state.with_store(move |store| store.delete_job(id)).await?;
    state.metrics.increment_jobs_deleted();
    Ok(StatusCode::NO_CONTENT)
}

/// Unsafe methods never get a 304; a would-be 304 is a 412 here
fn check_preconditions(
    current: &JobDetails,
    method: &Method,
    headers: &HeaderMap,
) -> RestResult<()> {
    match Validators::for_details(current)?.evaluate(method, headers) {
        Precondition::Proceed => Ok(()),
        Precondition::NotModified | Precondition::Failed => Err(RestError::PreconditionFailed),
    }
}

async fn write_job<S: JobStore + 'static>(
    state: &AppState<S>,
    id: i64,
    job: NewJob,
) -> RestResult<Response> {
    let details = state
        .with_store(move |store| {
            store.update_job(id, job, Utc::now())?;
            store.job_details(id)
        })
        .await?;
    let validators = Validators::for_details(&details)?;

    let mut response = Json(details).into_response();
    validators.apply(response.headers_mut());
    Ok(response)
}
