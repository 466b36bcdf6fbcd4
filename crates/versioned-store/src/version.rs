use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AggregateId;

/// Version number of an aggregate snapshot.
///
/// Versions start at 1 for the snapshot created by `append` and increase by
/// exactly 1 for every subsequent update of the same aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the first version (1) every aggregate starts at.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Address of exactly one historical snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedId {
    pub aggregate_id: AggregateId,
    pub version: Version,
}

impl VersionedId {
    pub fn new(aggregate_id: AggregateId, version: Version) -> Self {
        Self {
            aggregate_id,
            version,
        }
    }

    /// Address of the first snapshot of an aggregate.
    pub fn first(aggregate_id: AggregateId) -> Self {
        Self::new(aggregate_id, Version::first())
    }
}

impl std::fmt::Display for VersionedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@v{}", self.aggregate_id, self.version)
    }
}

/// An immutable snapshot of aggregate data as recorded in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Which aggregate and which version this snapshot is.
    pub id: VersionedId,

    /// The aggregate data at this version.
    pub data: T,

    /// When the store recorded this version.
    pub recorded_at: DateTime<Utc>,
}

impl<T> Versioned<T> {
    pub fn aggregate_id(&self) -> AggregateId {
        self.id.aggregate_id
    }

    pub fn version(&self) -> Version {
        self.id.version
    }

    /// Maps the payload, keeping the address and recording time.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned {
            id: self.id,
            data: f(self.data),
            recorded_at: self.recorded_at,
        }
    }
}
