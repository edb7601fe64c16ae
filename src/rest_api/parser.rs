//! # Query Parameter Parser
//!
//! Parses `GET /jobs/` query parameters into a filter and an ordering.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::errors::RestResult;
use super::filter::parse_job_filter;
use crate::store::{JobFilter, JobOrdering, OrderBy, OrderField};

/// Parsed job list query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: JobFilter,
    pub ordering: JobOrdering,
}

impl ListQuery {
    /// Parse query parameters from a HashMap
    pub fn parse(params: &HashMap<String, String>, now: DateTime<Utc>) -> RestResult<Self> {
        let filter = parse_job_filter(params, now)?;
        let ordering = params
            .get("ordering")
            .map(|value| parse_ordering(value))
            .unwrap_or_default();
        Ok(Self { filter, ordering })
    }
}

/// Parse `ordering` (comma-separated, `-` prefix for descending)
///
/// Unknown fields are dropped; nothing valid means the default ordering.
pub fn parse_ordering(value: &str) -> JobOrdering {
    let mut terms = Vec::new();

    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (name, descending) = match part.strip_prefix('-') {
            Some(name) => (name, true),
            None => (part, false),
        };

        if let Some(field) = OrderField::from_name(name) {
            terms.push(OrderBy { field, descending });
        }
    }

    JobOrdering::new(terms)
}
