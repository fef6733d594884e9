//! Server error types

use thiserror::Error;
use utm_core::UtmError;

/// Errors that can occur in the utm server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The attribution cookie settings were rejected
    #[error("invalid cookie configuration: {0}")]
    Config(#[from] UtmError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
