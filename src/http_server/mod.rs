//! # HTTP Server Module
//!
//! Serves the job REST API together with operational endpoints.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/metrics` - Request and job counters
//! - `/jobtemplates/*`, `/jobs/*` - see [`crate::rest_api`]

pub mod middleware;
pub mod observability_routes;
pub mod server;

pub use server::{build_router, HttpServer};
