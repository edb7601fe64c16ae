//! # Job List Filter
//!
//! Turns `GET /jobs/` query parameters into a [`JobFilter`].
//!
//! Empty values and unknown keys are ignored. Integer fields and choice
//! codes that don't parse are rejected with 400.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use super::errors::{RestError, RestResult};
use crate::model::{JobStatus, JobType};
use crate::store::JobFilter;

/// Largest accepted `days_since_creation` magnitude
pub const MAX_DAYS_SINCE_CREATION: i64 = 100_000;

/// Build the job filter from the request's query parameters
pub fn parse_job_filter(
    params: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> RestResult<JobFilter> {
    let mut filter = JobFilter::default();

    for (key, value) in params {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "id" => filter.id = Some(parse_integer(key, value)?),
            "progress" => filter.progress = Some(parse_integer(key, value)?),
            "namespace" => filter.namespace = Some(value.to_string()),
            "name" => filter.name = Some(value.to_string()),
            "owner" => filter.owner = Some(value.to_string()),
            "type" => {
                filter.job_type = Some(parse_choice(key, value, JobType::from_code)?);
            }
            "status" => {
                filter.status = Some(parse_choice(key, value, JobStatus::from_code)?);
            }
            "type_name" => filter.type_name = Some(value.to_string()),
            "days_since_creation" => {
                filter.modified_since = days_since_creation(value, now)?;
            }
            _ => {}
        }
    }

    Ok(filter)
}

fn parse_integer(key: &str, value: &str) -> RestResult<i64> {
    value.parse().map_err(|_| {
        RestError::InvalidQueryParam(format!("{}: Enter a whole number, got '{}'", key, value))
    })
}

fn parse_choice<T>(key: &str, value: &str, lookup: fn(i64) -> Option<T>) -> RestResult<T> {
    value.parse().ok().and_then(lookup).ok_or_else(|| {
        RestError::InvalidQueryParam(format!(
            "{}: Select a valid choice. {} is not one of the available choices.",
            key, value
        ))
    })
}

/// Start of the UTC calendar day `value` days before `now`
///
/// Whole numbers filter, fractional numbers are ignored, anything that
/// is not a number is an error.
fn days_since_creation(value: &str, now: DateTime<Utc>) -> RestResult<Option<DateTime<Utc>>> {
    let days: f64 = value.parse().map_err(|_| {
        RestError::InvalidQueryParam(format!(
            "days_since_creation: Enter a number, got '{}'",
            value
        ))
    })?;
    if !days.is_finite() || days.fract() != 0.0 {
        return Ok(None);
    }

    let days = (days as i64).clamp(-MAX_DAYS_SINCE_CREATION, MAX_DAYS_SINCE_CREATION);
    let cutoff = (now - Duration::days(days)).date_naive();
    Ok(Some(cutoff.and_time(NaiveTime::MIN).and_utc()))
}
