//! Payment error types.

use domain::{CustomerId, DomainError};
use thiserror::Error;

/// Errors that can occur while creating a payment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// A collaborator has no record of the requested entity.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The customer has no payment method configured.
    #[error("Payment method not configured for customer {0}")]
    NotConfigured(CustomerId),

    /// A collaborator failed for reasons of its own.
    #[error("{service} failed: {reason}")]
    CollaboratorFailure {
        service: &'static str,
        reason: String,
    },

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl PaymentError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        PaymentError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unavailable(service: &'static str) -> Self {
        PaymentError::CollaboratorFailure {
            service,
            reason: "service unavailable".to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::NotFound { .. } => "not_found",
            PaymentError::NotConfigured(_) => "not_configured",
            PaymentError::CollaboratorFailure { .. } => "collaborator_failure",
            PaymentError::Domain(_) => "domain",
        }
    }
}

/// Convenience type alias for payment results.
pub type Result<T> = std::result::Result<T, PaymentError>;
