//! `/jobs/{job_id}/parameters/` handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::errors::RestResult;
use super::server::AppState;
use crate::model::{JobParameter, ParameterInput, ParameterPatch};
use crate::store::JobStore;

pub(super) async fn list_parameters<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> RestResult<Json<Vec<JobParameter>>> {
    let Path(job_id) = path?;
    Ok(Json(
        state
            .with_store(move |store| store.list_parameters(job_id))
            .await?,
    ))
}

pub(super) async fn create_parameter<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ParameterInput>, JsonRejection>,
) -> RestResult<(StatusCode, Json<JobParameter>)> {
    let Path(job_id) = path?;
    state.with_store(move |store| store.get_job(job_id)).await?;
    let Json(input) = payload?;
    let parameter = input.validate()?;
    let created = state
        .with_store(move |store| store.create_parameter(job_id, parameter))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_parameter<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> RestResult<Json<JobParameter>> {
    let Path((job_id, id)) = path?;
    Ok(Json(
        state
            .with_store(move |store| store.get_parameter(job_id, id))
            .await?,
    ))
}

pub(super) async fn update_parameter<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<ParameterInput>, JsonRejection>,
) -> RestResult<Json<JobParameter>> {
    let Path((job_id, id)) = path?;
    state
        .with_store(move |store| store.get_parameter(job_id, id))
        .await?;
    let Json(input) = payload?;
    let parameter = input.validate()?;
    let updated = state
        .with_store(move |store| store.update_parameter(job_id, id, parameter))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn patch_parameter<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<ParameterPatch>, JsonRejection>,
) -> RestResult<Json<JobParameter>> {
    let Path((job_id, id)) = path?;
    let current = state
        .with_store(move |store| store.get_parameter(job_id, id))
        .await?;
    let Json(patch) = payload?;
    let merged = patch.merge(&current).validate()?;
    let updated = state
        .with_store(move |store| store.update_parameter(job_id, id, merged))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn delete_parameter<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> RestResult<StatusCode> {
    let Path((job_id, id)) = path?;
    state
        .with_store(move |store| store.delete_parameter(job_id, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
