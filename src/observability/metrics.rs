//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase, reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of request and job counters
///
/// All counters use Relaxed ordering; readers only need eventual values.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    requests_served: AtomicU64,
    client_errors: AtomicU64,
    server_errors: AtomicU64,
    not_modified: AtomicU64,
    precondition_failed: AtomicU64,
    jobs_created: AtomicU64,
    jobs_deleted: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed request by its status code
    pub fn record_response(&self, status: u16) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        match status {
            304 => {
                self.not_modified.fetch_add(1, Ordering::Relaxed);
            }
            412 => {
                self.precondition_failed.fetch_add(1, Ordering::Relaxed);
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            400..=499 => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            500..=599 => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Increment jobs created
    pub fn increment_jobs_created(&self) {
        self.jobs_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment jobs deleted
    pub fn increment_jobs_deleted(&self) {
        self.jobs_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            not_modified: self.not_modified.load(Ordering::Relaxed),
            precondition_failed: self.precondition_failed.load(Ordering::Relaxed),
            jobs_created: self.jobs_created.load(Ordering::Relaxed),
            jobs_deleted: self.jobs_deleted.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_served: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub not_modified: u64,
    pub precondition_failed: u64,
    pub jobs_created: u64,
    pub jobs_deleted: u64,
}
