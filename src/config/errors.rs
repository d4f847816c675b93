//! Configuration error types
//!
//! Error codes:
//! - CAS_CONFIG_READ
//! - CAS_CONFIG_PARSE
//! - CAS_CONFIG_INVALID

use thiserror::Error;

use crate::observability::Severity;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config '{path}': {reason}")]
    Read {
        /// Config file path
        path: String,
        /// Underlying error
        reason: String,
    },

    /// Config file is not valid JSON or has an unknown value
    #[error("Invalid config JSON: {0}")]
    Parse(String),

    /// Config parses but is inconsistent
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CAS_CONFIG_READ",
            ConfigError::Parse(_) => "CAS_CONFIG_PARSE",
            ConfigError::Invalid(_) => "CAS_CONFIG_INVALID",
        }
    }

    /// A process cannot start on a bad config
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}
