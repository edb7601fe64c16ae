//! Job list filtering and ordering
//!
//! Both types render to SQL fragments with positional parameters so the
//! SQLite store never interpolates user input.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;

use crate::model::{JobStatus, JobType};

/// Equality filters for `GET /jobs/`, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub id: Option<i64>,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
    pub progress: Option<i64>,
    /// Display name of a job type; an unknown name matches nothing
    pub type_name: Option<String>,
    /// Keep jobs modified at or after this instant
    pub modified_since: Option<DateTime<Utc>>,
}

impl JobFilter {
    /// Render as a `WHERE` clause (empty when nothing filters)
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(id) = self.id {
            clauses.push("id = ?");
            values.push(Value::Integer(id));
        }
        if let Some(namespace) = &self.namespace {
            clauses.push("namespace = ?");
            values.push(Value::Text(namespace.clone()));
        }
        if let Some(name) = &self.name {
            clauses.push("name = ?");
            values.push(Value::Text(name.clone()));
        }
        if let Some(owner) = &self.owner {
            clauses.push("owner = ?");
            values.push(Value::Text(owner.clone()));
        }
        if let Some(job_type) = self.job_type {
            clauses.push("job_type = ?");
            values.push(Value::Integer(job_type.code()));
        }
        if let Some(status) = self.status {
            clauses.push("status = ?");
            values.push(Value::Integer(status.code()));
        }
        if let Some(progress) = self.progress {
            clauses.push("progress = ?");
            values.push(Value::Integer(progress));
        }
        if let Some(type_name) = &self.type_name {
            clauses.push("job_type = ?");
            let code = JobType::from_name(type_name).map_or(-1, JobType::code);
            values.push(Value::Integer(code));
        }
        if let Some(since) = self.modified_since {
            clauses.push("date_modified_ms >= ?");
            values.push(Value::Integer(since.timestamp_millis()));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

/// Sortable job fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Type,
    Status,
    DateCreated,
}

impl OrderField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "type" => Some(OrderField::Type),
            "status" => Some(OrderField::Status),
            "date_created" => Some(OrderField::DateCreated),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            OrderField::Type => "job_type",
            OrderField::Status => "status",
            OrderField::DateCreated => "date_created_ms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: OrderField,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: OrderField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: OrderField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Ordering of the job list; newest first unless told otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOrdering(Vec<OrderBy>);

impl Default for JobOrdering {
    fn default() -> Self {
        Self(vec![OrderBy::desc(OrderField::DateCreated)])
    }
}

impl JobOrdering {
    /// Build from parsed terms. Repeated fields keep their first
    /// occurrence; no terms at all means the default.
    pub fn new(terms: Vec<OrderBy>) -> Self {
        let mut unique: Vec<OrderBy> = Vec::with_capacity(terms.len());
        for term in terms {
            if !unique.iter().any(|t| t.field == term.field) {
                unique.push(term);
            }
        }
        if unique.is_empty() {
            Self::default()
        } else {
            Self(unique)
        }
    }

    pub fn terms(&self) -> &[OrderBy] {
        &self.0
    }

    /// Render as an `ORDER BY` clause; `id` breaks ties
    pub(crate) fn to_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .0
            .iter()
            .map(|t| format!("{} {}", t.field.column(), direction(t.descending)))
            .collect();

        let id_descending = self
            .0
            .iter()
            .find(|t| t.field == OrderField::DateCreated)
            .is_some_and(|t| t.descending);
        parts.push(format!("id {}", direction(id_descending)));

        format!(" ORDER BY {}", parts.join(", "))
    }
}

fn direction(descending: bool) -> &'static str {
    if descending {
        "DESC"
    } else {
        "ASC"
    }
}
