//! Per-job parameters and log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{required_text, ValidationErrors, MAX_TEXT_LEN};

/// A key/value pair attached to a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobParameter {
    pub id: i64,
    pub job: i64,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParameter {
    pub key: String,
    pub value: String,
}

/// Body of parameter `POST` and `PUT`
///
/// A `job` key in the body is ignored; the URL decides ownership.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterInput {
    pub key: Option<String>,
    #[serde(default)]
    pub value: String,
}

impl ParameterInput {
    pub fn validate(self) -> Result<NewParameter, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let key = required_text(&mut errors, "key", self.key, Some(MAX_TEXT_LEN));
        errors.finish(NewParameter {
            key,
            value: self.value,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterPatch {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl ParameterPatch {
    pub fn merge(self, current: &JobParameter) -> ParameterInput {
        ParameterInput {
            key: Some(self.key.unwrap_or_else(|| current.key.clone())),
            value: self.value.unwrap_or_else(|| current.value.clone()),
        }
    }
}

/// A timestamped message attached to a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobLogEntry {
    pub id: i64,
    pub job: i64,
    pub date_created: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogEntryInput {
    pub message: Option<String>,
}

impl LogEntryInput {
    pub fn validate(self) -> Result<NewLogEntry, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let message = required_text(&mut errors, "message", self.message, None);
        errors.finish(NewLogEntry { message })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogEntryPatch {
    pub message: Option<String>,
}

impl LogEntryPatch {
    pub fn merge(self, current: &JobLogEntry) -> LogEntryInput {
        LogEntryInput {
            message: Some(self.message.unwrap_or_else(|| current.message.clone())),
        }
    }
}
