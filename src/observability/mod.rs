//! Observability subsystem
//!
//! - Structured logging through `tracing`
//! - Relaxed atomic counters
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No background threads
//! 4. Deterministic field ordering
//!
//! # Usage
//!
//! ```ignore
//! use aerocas::observability::{log_event, Event, MetricsRegistry};
//!
//! log_event(Event::ViewCreated, &[("view", "_InitialView")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_cursors();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else if event.is_verbose() {
        Severity::Trace
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::TypeSystemCommitted, &[("types", "3")]);
        log_event(Event::DeserializeFailed, &[("code", "CAS_CODEC_MALFORMED")]);
    }
}
