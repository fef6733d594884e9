//! Error types for utm-core

use thiserror::Error;

/// Errors raised by the attribution engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UtmError {
    /// A setter or config loader received an out-of-domain value
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested key is not one of the five canonical UTM keys
    #[error("unknown utm key \"{0}\"")]
    UnknownKey(String),
}

/// Result alias for engine operations
pub type UtmResult<T> = Result<T, UtmError>;
