//! Integer-coded choice fields
//!
//! Both enums travel over the wire as their integer code; the display
//! name is exposed read-only next to it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of work a job or template describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum JobType {
    Generic,
    Import,
    Export,
    Analysis,
    Maintenance,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::Generic,
        JobType::Import,
        JobType::Export,
        JobType::Analysis,
        JobType::Maintenance,
    ];

    pub fn code(self) -> i64 {
        match self {
            JobType::Generic => 0,
            JobType::Import => 1,
            JobType::Export => 2,
            JobType::Analysis => 3,
            JobType::Maintenance => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Human readable name, as used by the `type_name` filter
    pub fn name(self) -> &'static str {
        match self {
            JobType::Generic => "Generic",
            JobType::Import => "Import",
            JobType::Export => "Export",
            JobType::Analysis => "Analysis",
            JobType::Maintenance => "Maintenance",
        }
    }

    /// Exact, case-sensitive lookup by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl TryFrom<i64> for JobType {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| invalid_choice(code))
    }
}

impl From<JobType> for i64 {
    fn from(value: JobType) -> Self {
        value.code()
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Succeeded,
        JobStatus::Failed,
        JobStatus::Canceled,
    ];

    pub fn code(self) -> i64 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Running => 1,
            JobStatus::Succeeded => 2,
            JobStatus::Failed => 3,
            JobStatus::Canceled => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Running => "Running",
            JobStatus::Succeeded => "Succeeded",
            JobStatus::Failed => "Failed",
            JobStatus::Canceled => "Canceled",
        }
    }
}

impl TryFrom<i64> for JobStatus {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| invalid_choice(code))
    }
}

impl From<JobStatus> for i64 {
    fn from(value: JobStatus) -> Self {
        value.code()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn invalid_choice(code: impl fmt::Display) -> String {
    format!("Select a valid choice. {} is not one of the available choices.", code)
}
