//! Field-level validation errors for incoming payloads

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::choices::invalid_choice;

/// Maximum length of short text fields (names, keys, owners)
pub const MAX_TEXT_LEN: usize = 255;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";

/// Messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// `Ok(value)` when no error was recorded
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A required, non-blank text field
pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max_len: Option<usize>,
) -> String {
    match value {
        None => {
            errors.add(field, REQUIRED);
            String::new()
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            String::new()
        }
        Some(v) => {
            check_len(errors, field, &v, max_len);
            v
        }
    }
}

/// An optional text field that may be blank
pub(crate) fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: String,
    max_len: usize,
) -> String {
    check_len(errors, field, &value, Some(max_len));
    value
}

fn check_len(errors: &mut ValidationErrors, field: &str, value: &str, max_len: Option<usize>) {
    if let Some(max) = max_len {
        if value.chars().count() > max {
            errors.add(
                field,
                format!("Ensure this field has no more than {} characters.", max),
            );
        }
    }
}

/// Resolve an integer choice code, recording an error when unknown
pub(crate) fn choice<T>(
    errors: &mut ValidationErrors,
    field: &str,
    code: i64,
    lookup: fn(i64) -> Option<T>,
) -> Option<T> {
    let resolved = lookup(code);
    if resolved.is_none() {
        errors.add(field, invalid_choice(code));
    }
    resolved
}
