//! # Job System REST API Module
//!
//! HTTP resources for job templates, jobs, job parameters and job log
//! entries, backed by any [`JobStore`](crate::store::JobStore).
//!
//! | Route | Methods |
//! |---|---|
//! | `/jobtemplates/` | GET, POST |
//! | `/jobtemplates/{id}/` | GET, PUT, PATCH, DELETE |
//! | `/jobs/` | GET (filters + `ordering`), POST |
//! | `/jobs/{id}/` | GET, PUT, PATCH (conditional), DELETE |
//! | `/jobs/{id}/parameters/[{id}/]` | as above |
//! | `/jobs/{id}/logs/[{id}/]` | as above |

pub mod conditional;
pub mod errors;
pub mod filter;
pub mod format;
mod jobs;
mod logs;
mod parameters;
pub mod parser;
pub mod server;
mod templates;

pub use conditional::{Precondition, Validators};
pub use errors::{ErrorResponse, RestError, RestResult};
pub use format::normalize_request;
pub use parser::ListQuery;
pub use server::{router, AppState};
