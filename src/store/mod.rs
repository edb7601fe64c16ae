//! Persistence for templates, jobs, parameters and log entries
//!
//! [`JobStore`] is the seam between the HTTP layer and storage. Write
//! operations take `now` explicitly so callers (and tests) control the
//! timestamps that end up in `date_created` / `date_modified`.

mod errors;
mod query;
mod schema;
mod sqlite;

pub use errors::{StoreError, StoreResult};
pub use query::{JobFilter, JobOrdering, OrderBy, OrderField};
pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteJobStore;

use chrono::{DateTime, Utc};

use crate::model::{
    Job, JobDetails, JobLogEntry, JobParameter, JobTemplate, NewJob, NewLogEntry, NewParameter,
    NewTemplate,
};

/// Storage operations behind the REST resources
///
/// Child operations take the owning `job_id`; a child that exists but
/// belongs to another job is [`StoreError::NotFound`].
pub trait JobStore: Send + Sync {
    fn list_templates(&self) -> StoreResult<Vec<JobTemplate>>;
    fn create_template(&self, template: NewTemplate) -> StoreResult<JobTemplate>;
    fn get_template(&self, id: i64) -> StoreResult<JobTemplate>;
    fn update_template(&self, id: i64, template: NewTemplate) -> StoreResult<JobTemplate>;
    /// Jobs created from the template keep existing with `template = null`
    fn delete_template(&self, id: i64) -> StoreResult<()>;

    fn list_jobs(&self, filter: &JobFilter, ordering: &JobOrdering) -> StoreResult<Vec<Job>>;
    /// Creates the job and, when it references a template, copies the
    /// template's default parameters onto it
    fn create_job(&self, job: NewJob, now: DateTime<Utc>) -> StoreResult<Job>;
    fn get_job(&self, id: i64) -> StoreResult<Job>;
    fn job_details(&self, id: i64) -> StoreResult<JobDetails>;
    fn update_job(&self, id: i64, job: NewJob, now: DateTime<Utc>) -> StoreResult<Job>;
    /// Also removes the job's parameters and log entries
    fn delete_job(&self, id: i64) -> StoreResult<()>;

    fn list_parameters(&self, job_id: i64) -> StoreResult<Vec<JobParameter>>;
    fn create_parameter(&self, job_id: i64, parameter: NewParameter) -> StoreResult<JobParameter>;
    fn get_parameter(&self, job_id: i64, id: i64) -> StoreResult<JobParameter>;
    fn update_parameter(
        &self,
        job_id: i64,
        id: i64,
        parameter: NewParameter,
    ) -> StoreResult<JobParameter>;
    fn delete_parameter(&self, job_id: i64, id: i64) -> StoreResult<()>;

    fn list_log_entries(&self, job_id: i64) -> StoreResult<Vec<JobLogEntry>>;
    fn create_log_entry(
        &self,
        job_id: i64,
        entry: NewLogEntry,
        now: DateTime<Utc>,
    ) -> StoreResult<JobLogEntry>;
    fn get_log_entry(&self, job_id: i64, id: i64) -> StoreResult<JobLogEntry>;
    fn update_log_entry(&self, job_id: i64, id: i64, entry: NewLogEntry)
        -> StoreResult<JobLogEntry>;
    fn delete_log_entry(&self, job_id: i64, id: i64) -> StoreResult<()>;
}
