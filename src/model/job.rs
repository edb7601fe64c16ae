//! Jobs and their request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::choices::{JobStatus, JobType};
use super::entries::{JobLogEntry, JobParameter};
use super::validation::{
    choice, optional_text, required_text, ValidationErrors, MAX_TEXT_LEN, REQUIRED,
};

/// Upper bound of `progress`
pub const MAX_PROGRESS: u8 = 100;

/// A stored job
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: i64,
    pub namespace: String,
    pub name: String,
    pub job_type: JobType,
    pub status: JobStatus,
    pub progress: u8,
    pub owner: String,
    pub template: Option<i64>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

#[derive(Serialize)]
struct JobView<'a> {
    id: i64,
    namespace: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    job_type: JobType,
    type_name: &'static str,
    status: JobStatus,
    status_name: &'static str,
    progress: u8,
    owner: &'a str,
    template: Option<i64>,
    date_created: DateTime<Utc>,
    date_modified: DateTime<Utc>,
}

impl Serialize for Job {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JobView {
            id: self.id,
            namespace: &self.namespace,
            name: &self.name,
            job_type: self.job_type,
            type_name: self.job_type.name(),
            status: self.status,
            status_name: self.status.name(),
            progress: self.progress,
            owner: &self.owner,
            template: self.template,
            date_created: self.date_created,
            date_modified: self.date_modified,
        }
        .serialize(serializer)
    }
}

/// Job detail representation with nested parameters and log entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: Job,
    pub parameters: Vec<JobParameter>,
    pub logs: Vec<JobLogEntry>,
}

/// Validated job fields, ready for the store
///
/// `job_type` is `None` only when a template is given; the store then
/// inherits the template's type.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub namespace: String,
    pub name: String,
    pub job_type: Option<JobType>,
    pub status: JobStatus,
    pub progress: u8,
    pub owner: String,
    pub template: Option<i64>,
}

/// Body of `POST /jobs/` and `PUT /jobs/{id}/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub namespace: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<i64>,
    pub status: Option<i64>,
    pub progress: Option<i64>,
    #[serde(default)]
    pub owner: String,
    pub template: Option<i64>,
}

impl JobInput {
    pub fn validate(self) -> Result<NewJob, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let namespace = optional_text(&mut errors, "namespace", self.namespace, MAX_TEXT_LEN);
        let name = required_text(&mut errors, "name", self.name, Some(MAX_TEXT_LEN));
        let owner = optional_text(&mut errors, "owner", self.owner, MAX_TEXT_LEN);

        let job_type = match self.job_type {
            Some(code) => choice(&mut errors, "type", code, JobType::from_code),
            None => {
                if self.template.is_none() {
                    errors.add("type", REQUIRED);
                }
                None
            }
        };
        let status = match self.status {
            Some(code) => choice(&mut errors, "status", code, JobStatus::from_code),
            None => Some(JobStatus::default()),
        };
        let progress = match self.progress {
            None => 0,
            Some(p) if (0..=i64::from(MAX_PROGRESS)).contains(&p) => p as u8,
            Some(p) => {
                let message = if p < 0 {
                    "Ensure this value is greater than or equal to 0.".to_string()
                } else {
                    format!(
                        "Ensure this value is less than or equal to {}.",
                        MAX_PROGRESS
                    )
                };
                errors.add("progress", message);
                0
            }
        };

        let status = status.unwrap_or_default();
        errors.finish(NewJob {
            namespace,
            name,
            job_type,
            status,
            progress,
            owner,
            template: self.template,
        })
    }
}

/// Body of `PATCH /jobs/{id}/`
///
/// `template` distinguishes an absent key from an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    pub namespace: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<i64>,
    pub status: Option<i64>,
    pub progress: Option<i64>,
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub template: Option<Option<i64>>,
}

impl JobPatch {
    /// Overlay the supplied fields on the stored job
    pub fn merge(self, current: &Job) -> JobInput {
        JobInput {
            namespace: self.namespace.unwrap_or_else(|| current.namespace.clone()),
            name: Some(self.name.unwrap_or_else(|| current.name.clone())),
            job_type: Some(self.job_type.unwrap_or(current.job_type.code())),
            status: Some(self.status.unwrap_or(current.status.code())),
            progress: Some(self.progress.unwrap_or(i64::from(current.progress))),
            owner: self.owner.unwrap_or_else(|| current.owner.clone()),
            template: self.template.unwrap_or(current.template),
        }
    }
}

fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
