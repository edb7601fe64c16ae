//! # REST API Router
//!
//! Axum routes for templates, jobs, and the per-job parameter and log
//! collections. Paths here are canonical (no trailing slash, no format
//! suffix); see [`super::format`].

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use super::errors::{RestError, RestResult};
use super::{jobs, logs, parameters, templates};
use crate::observability::MetricsRegistry;
use crate::store::{JobStore, StoreResult};

/// Shared handler state
pub struct AppState<S> {
    pub store: Arc<S>,
    pub metrics: Arc<MetricsRegistry>,
}

impl<S> AppState<S> {
    pub fn new(store: S) -> Self {
        Self::with_metrics(Arc::new(store), Arc::new(MetricsRegistry::new()))
    }

    pub fn with_metrics(store: Arc<S>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { store, metrics }
    }
}

impl<S: JobStore + 'static> AppState<S> {
    /// Run a store operation on the blocking thread pool
    ///
    /// SQLite calls block on the connection mutex and on disk I/O; they
    /// never run on an async worker thread.
    pub async fn with_store<T, F>(&self, op: F) -> RestResult<T>
    where
        F: FnOnce(&S) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| RestError::Internal(format!("store task failed: {}", e)))?
            .map_err(RestError::from)
    }
}

// Manual impl: `S` itself need not be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Build the resource router
pub fn router<S: JobStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/jobtemplates",
            get(templates::list_templates::<S>).post(templates::create_template::<S>),
        )
        .route(
            "/jobtemplates/:id",
            get(templates::get_template::<S>)
                .put(templates::update_template::<S>)
                .patch(templates::patch_template::<S>)
                .delete(templates::delete_template::<S>),
        )
        .route("/jobs", get(jobs::list_jobs::<S>).post(jobs::create_job::<S>))
        .route(
            "/jobs/:id",
            get(jobs::get_job::<S>)
                .put(jobs::update_job::<S>)
                .patch(jobs::patch_job::<S>)
                .delete(jobs::delete_job::<S>),
        )
        .route(
            "/jobs/:job_id/parameters",
            get(parameters::list_parameters::<S>).post(parameters::create_parameter::<S>),
        )
        .route(
            "/jobs/:job_id/parameters/:id",
            get(parameters::get_parameter::<S>)
                .put(parameters::update_parameter::<S>)
                .patch(parameters::patch_parameter::<S>)
                .delete(parameters::delete_parameter::<S>),
        )
        .route(
            "/jobs/:job_id/logs",
            get(logs::list_log_entries::<S>).post(logs::create_log_entry::<S>),
        )
        .route(
            "/jobs/:job_id/logs/:id",
            get(logs::get_log_entry::<S>)
                .put(logs::update_log_entry::<S>)
                .patch(logs::patch_log_entry::<S>)
                .delete(logs::delete_log_entry::<S>),
        )
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> RestError {
    RestError::NotFound
}
