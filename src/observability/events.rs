//! Observable lifecycle events
//!
//! Events are explicit and typed so log consumers can key on stable names.

use std::fmt;

/// Observable events in the job service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Configuration
    /// Configuration loaded and validated
    ConfigLoaded,

    // Store
    /// Database opened
    StoreOpened,
    /// Schema created or already current
    SchemaMigrated,
    /// Database could not be opened (FATAL)
    StoreOpenFailed,

    // Server
    /// Listener bound, serving requests
    ServerListening,
    /// A request completed with a non-5xx status
    RequestComplete,
    /// A request completed with a 5xx status
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::SchemaMigrated => "SCHEMA_MIGRATED",
            Event::StoreOpenFailed => "STORE_OPEN_FAILED",
            Event::ServerListening => "SERVER_LISTENING",
            Event::RequestComplete => "REQUEST_COMPLETE",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StoreOpenFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
