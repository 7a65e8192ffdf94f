//! Error types for the flux core engine.

use thiserror::Error;

/// Errors reported by adapters.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The adapter could not begin listening.
    #[error("failed to start listening: {reason}")]
    ListenFailed {
        /// Reason for failure.
        reason: String,
    },

    /// The adapter is not connected to its platform.
    #[error("adapter not connected: {reason}")]
    NotConnected {
        /// Reason for failure.
        reason: String,
    },

    /// An outgoing message could not be delivered.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;
