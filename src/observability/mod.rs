//! Observability for the job service
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Atomic counters
//!
//! # Usage
//!
//! ```
//! use jobsys::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, Severity};
//!
//! Logger::log(Severity::Info, "JOB_CREATED", &[("id", "42")]);
//! log_event_with_fields(Event::ConfigLoaded, &[("port", "8000")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.record_response(200);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

fn severity_for(event: Event) -> Severity {
    match event {
        e if e.is_fatal() => Severity::Fatal,
        Event::RequestFailed => Severity::Error,
        _ => Severity::Info,
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}
