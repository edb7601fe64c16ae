//! jobsys - a minimal REST API for tracking technology-independent jobs
//!
//! Job templates, jobs, job parameters and job log entries over HTTP/JSON,
//! stored in SQLite.

pub mod cli;
pub mod config;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod rest_api;
pub mod store;
