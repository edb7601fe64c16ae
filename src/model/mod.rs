//! Domain types and request payloads
//!
//! Stored types serialize to the wire representation; `*Input` and
//! `*Patch` types deserialize request bodies and validate into the
//! `New*` types the store accepts.

mod choices;
mod entries;
mod job;
mod template;
mod validation;

pub use choices::{JobStatus, JobType};
pub use entries::{
    JobLogEntry, JobParameter, LogEntryInput, LogEntryPatch, NewLogEntry, NewParameter,
    ParameterInput, ParameterPatch,
};
pub use job::{Job, JobDetails, JobInput, JobPatch, NewJob, MAX_PROGRESS};
pub use template::{JobTemplate, NewTemplate, TemplateInput, TemplatePatch};
pub use validation::{ValidationErrors, MAX_TEXT_LEN};
