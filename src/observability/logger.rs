//! Structured logger
//!
//! Records are forwarded to `tracing`; the library never installs a
//! subscriber, so nothing is printed unless the embedding binary does.
//!
//! - Explicit severity levels
//! - One log record = one event
//! - Deterministic field ordering (alphabetical by key)

use std::fmt;

/// Log and error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation rejected, caller error
    Error = 3,
    /// Unrecoverable for the current build or document
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forwards structured records to `tracing`.
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let fields = render_fields(fields);
        match severity {
            Severity::Trace => tracing::debug!(event, fields = %fields),
            Severity::Info => tracing::info!(event, fields = %fields),
            Severity::Warn => tracing::warn!(event, fields = %fields),
            Severity::Error | Severity::Fatal => {
                tracing::error!(event, severity = severity.as_str(), fields = %fields)
            }
        }
    }
}

/// Renders `key=value` pairs sorted by key. Values containing whitespace,
/// quotes or `=` are quoted.
fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::with_capacity(fields.len() * 16);
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(key);
        out.push('=');
        if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
            out.push('"');
            for c in value.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        } else {
            out.push_str(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_sorted_by_key() {
        let rendered = render_fields(&[("zeta", "1"), ("alpha", "2")]);
        assert_eq!(rendered, "alpha=2 zeta=1");
    }

    #[test]
    fn test_values_quoted_when_needed() {
        let rendered = render_fields(&[("view", "_InitialView"), ("text", "a \"b\"")]);
        assert_eq!(rendered, "text=\"a \\\"b\\\"\" view=_InitialView");
        assert_eq!(render_fields(&[("empty", "")]), "empty=\"\"");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::Info > Severity::Trace);
        assert_eq!(Severity::Warn.to_string(), "WARN");
    }

    #[test]
    fn test_log_without_subscriber() {
        // No subscriber installed: must be a silent no-op
        Logger::log(Severity::Info, "TEST_EVENT", &[("k", "v")]);
        Logger::log(Severity::Fatal, "TEST_EVENT", &[]);
    }
}
