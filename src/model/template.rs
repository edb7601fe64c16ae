//! Job templates: reusable defaults for creating jobs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use super::choices::JobType;
use super::validation::{choice, required_text, ValidationErrors, MAX_TEXT_LEN, REQUIRED};

/// A stored job template
#[derive(Debug, Clone, PartialEq)]
pub struct JobTemplate {
    pub id: i64,
    pub name: String,
    pub job_type: JobType,
    pub default_parameters: BTreeMap<String, String>,
}

impl Serialize for JobTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            id: i64,
            name: &'a str,
            #[serde(rename = "type")]
            job_type: JobType,
            type_name: &'static str,
            default_parameters: &'a BTreeMap<String, String>,
        }

        View {
            id: self.id,
            name: &self.name,
            job_type: self.job_type,
            type_name: self.job_type.name(),
            default_parameters: &self.default_parameters,
        }
        .serialize(serializer)
    }
}

/// Validated template fields, ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub job_type: JobType,
    pub default_parameters: BTreeMap<String, String>,
}

/// Body of `POST /jobtemplates/` and `PUT /jobtemplates/{id}/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<i64>,
    #[serde(default)]
    pub default_parameters: BTreeMap<String, String>,
}

impl TemplateInput {
    pub fn validate(self) -> Result<NewTemplate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required_text(&mut errors, "name", self.name, Some(MAX_TEXT_LEN));
        let job_type = match self.job_type {
            Some(code) => choice(&mut errors, "type", code, JobType::from_code),
            None => {
                errors.add("type", REQUIRED);
                None
            }
        };
        for key in self.default_parameters.keys() {
            if key.trim().is_empty() {
                errors.add("default_parameters", "Parameter keys may not be blank.");
            }
        }

        match job_type {
            Some(job_type) => errors.finish(NewTemplate {
                name,
                job_type,
                default_parameters: self.default_parameters,
            }),
            None => Err(errors),
        }
    }
}

/// Body of `PATCH /jobtemplates/{id}/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<i64>,
    pub default_parameters: Option<BTreeMap<String, String>>,
}

impl TemplatePatch {
    /// Overlay the supplied fields on the stored template
    pub fn merge(self, current: &JobTemplate) -> TemplateInput {
        TemplateInput {
            name: Some(self.name.unwrap_or_else(|| current.name.clone())),
            job_type: Some(self.job_type.unwrap_or(current.job_type.code())),
            default_parameters: self
                .default_parameters
                .unwrap_or_else(|| current.default_parameters.clone()),
        }
    }
}
