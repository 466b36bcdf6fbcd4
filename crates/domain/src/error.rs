//! Domain error types.

use thiserror::Error;
use versioned_store::StoreError;

use crate::contract::ContractError;
use crate::plan::PlanError;

/// Errors that can occur during domain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An error occurred in the versioned store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A plan rule rejected the operation.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// A contract rule rejected the operation.
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),
}

impl DomainError {
    /// Returns true if the aggregate or version was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::Store(e) if e.is_not_found())
    }
}
