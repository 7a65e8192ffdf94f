//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime orchestration.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime's load phase has already been consumed by a start.
    #[error("runtime has already been started")]
    AlreadyStarted,

    /// No adapter survived the load phase; there is nothing to listen on.
    #[error("no adapters loaded, nothing to listen on")]
    NoAdapters,

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
