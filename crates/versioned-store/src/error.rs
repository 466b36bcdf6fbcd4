use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors that can occur when interacting with the versioned store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The aggregate has no history in the store.
    #[error("Aggregate not found: {0}")]
    NotFound(AggregateId),

    /// The aggregate exists but the requested version was never recorded.
    #[error("Version {version} not found for aggregate {aggregate_id}")]
    VersionNotFound {
        aggregate_id: AggregateId,
        version: Version,
    },

    /// An exact-version lookup named an aggregate the store has never seen.
    #[error("Unknown aggregate: {0}")]
    UnknownAggregate(AggregateId),

    /// An explicitly supplied id already has a history.
    #[error("Aggregate already exists: {0}")]
    DuplicateId(AggregateId),
}

impl StoreError {
    /// Returns true for the "id or version absent" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_)
                | StoreError::VersionNotFound { .. }
                | StoreError::UnknownAggregate(_)
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
