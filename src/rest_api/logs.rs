//! `/jobs/{job_id}/logs/` handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use super::errors::RestResult;
use super::server::AppState;
use crate::model::{JobLogEntry, LogEntryInput, LogEntryPatch};
use crate::store::JobStore;

pub(super) async fn list_log_entries<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> RestResult<Json<Vec<JobLogEntry>>> {
    let Path(job_id) = path?;
    Ok(Json(
        state
            .with_store(move |store| store.list_log_entries(job_id))
            .await?,
    ))
}

pub(super) async fn create_log_entry<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<LogEntryInput>, JsonRejection>,
) -> RestResult<(StatusCode, Json<JobLogEntry>)> {
    let Path(job_id) = path?;
    state.with_store(move |store| store.get_job(job_id)).await?;
    let Json(input) = payload?;
    let entry = input.validate()?;
    let created = state
        .with_store(move |store| store.create_log_entry(job_id, entry, Utc::now()))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_log_entry<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> RestResult<Json<JobLogEntry>> {
    let Path((job_id, id)) = path?;
    Ok(Json(
        state
            .with_store(move |store| store.get_log_entry(job_id, id))
            .await?,
    ))
}

pub(super) async fn update_log_entry<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<LogEntryInput>, JsonRejection>,
) -> RestResult<Json<JobLogEntry>> {
    let Path((job_id, id)) = path?;
    state
        .with_store(move |store| store.get_log_entry(job_id, id))
        .await?;
    let Json(input) = payload?;
    let entry = input.validate()?;
    let updated = state
        .with_store(move |store| store.update_log_entry(job_id, id, entry))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn patch_log_entry<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<LogEntryPatch>, JsonRejection>,
) -> RestResult<Json<JobLogEntry>> {
    let Path((job_id, id)) = path?;
    let current = state
        .with_store(move |store| store.get_log_entry(job_id, id))
        .await?;
    let Json(patch) = payload?;
    let merged = patch.merge(&current).validate()?;
    let updated = state
        .with_store(move |store| store.update_log_entry(job_id, id, merged))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn delete_log_entry<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> RestResult<StatusCode> {
    let Path((job_id, id)) = path?;
    state
        .with_store(move |store| store.delete_log_entry(job_id, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
