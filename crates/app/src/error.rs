//! Application error types.

use domain::DomainError;
use payments::PaymentError;
use thiserror::Error;

/// Errors surfaced by the application layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable held a value that could not be used.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Logging or metrics could not be installed.
    #[error("Telemetry setup failed: {0}")]
    Telemetry(String),

    /// Projections did not catch up in time.
    #[error("Projections did not drain within {0:?}")]
    DrainTimeout(std::time::Duration),

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Payment error.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

/// Convenience type alias for application results.
pub type Result<T> = std::result::Result<T, AppError>;
