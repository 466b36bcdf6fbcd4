//! Projection error types.

use thiserror::Error;

/// Errors reported by a projection for a single event.
///
/// These never leave the subscription task: the runner records them and moves
/// on to the next event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The handler returned an error.
    #[error("Handler error: {0}")]
    Handler(String),

    /// The handler panicked.
    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl ProjectionError {
    /// Wraps any displayable error from a handler.
    pub fn handler(error: impl std::fmt::Display) -> Self {
        ProjectionError::Handler(error.to_string())
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
