//! `/jobtemplates/` handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::errors::RestResult;
use super::server::AppState;
use crate::model::{JobTemplate, TemplateInput, TemplatePatch};
use crate::store::JobStore;

pub(super) async fn list_templates<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
) -> RestResult<Json<Vec<JobTemplate>>> {
    Ok(Json(state.with_store(|store| store.list_templates()).await?))
}

pub(super) async fn create_template<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<TemplateInput>, JsonRejection>,
) -> RestResult<(StatusCode, Json<JobTemplate>)> {
    let Json(input) = payload?;
    let template = input.validate()?;
    let created = state
        .with_store(move |store| store.create_template(template))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_template<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> RestResult<Json<JobTemplate>> {
    let Path(id) = path?;
    Ok(Json(state.with_store(move |store| store.get_template(id)).await?))
}

pub(super) async fn update_template<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TemplateInput>, JsonRejection>,
) -> RestResult<Json<JobTemplate>> {
    let Path(id) = path?;
    state.with_store(move |store| store.get_template(id)).await?;
    let Json(input) = payload?;
    let template = input.validate()?;
    let updated = state
        .with_store(move |store| store.update_template(id, template))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn patch_template<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TemplatePatch>, JsonRejection>,
) -> RestResult<Json<JobTemplate>> {
    let Path(id) = path?;
    let current = state.with_store(move |store| store.get_template(id)).await?;
    let Json(patch) = payload?;
    let merged = patch.merge(&current).validate()?;
    let updated = state
        .with_store(move |store| store.update_template(id, merged))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn delete_template<S: JobStore + 'static>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> RestResult<StatusCode> {
    let Path(id) = path?;
    state.with_store(move |store| store.delete_template(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
