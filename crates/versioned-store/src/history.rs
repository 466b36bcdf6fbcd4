use chrono::{DateTime, Utc};

use crate::{AggregateId, Version, Versioned, VersionedId};

/// Append-only history of one aggregate.
///
/// A history is never empty: it is created with its first snapshot, and the
/// latest snapshot is always the last one appended.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: Vec<Versioned<T>>,
    head: Versioned<T>,
}

impl<T: Clone> History<T> {
    /// Starts a history at version 1.
    pub fn start(aggregate_id: AggregateId, data: T, recorded_at: DateTime<Utc>) -> Self {
        Self {
            past: Vec::new(),
            head: Versioned {
                id: VersionedId::first(aggregate_id),
                data,
                recorded_at,
            },
        }
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.head.aggregate_id()
    }

    /// The most recently appended snapshot.
    pub fn latest(&self) -> &Versioned<T> {
        &self.head
    }

    /// Returns the snapshot recorded at `version`, if any.
    pub fn get(&self, version: Version) -> Option<&Versioned<T>> {
        if version == self.head.version() {
            return Some(&self.head);
        }
        let index = usize::try_from(version.as_u64().checked_sub(1)?).ok()?;
        self.past.get(index)
    }

    /// Appends `data` as the next version and returns the new snapshot.
    pub fn push(&mut self, data: T, recorded_at: DateTime<Utc>) -> &Versioned<T> {
        let next = Versioned {
            id: VersionedId::new(self.aggregate_id(), self.head.version().next()),
            data,
            recorded_at,
        };
        let previous = std::mem::replace(&mut self.head, next);
        self.past.push(previous);
        &self.head
    }

    /// All snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Versioned<T>> {
        self.past.iter().chain(std::iter::once(&self.head))
    }

    pub fn len(&self) -> usize {
        self.past.len() + 1
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_first_version() {
        let id = AggregateId::new();
        let history = History::start(id, "a", Utc::now());
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().version(), Version::first());
        assert_eq!(history.latest().aggregate_id(), id);
    }

    #[test]
    fn push_increments_version_and_keeps_order() {
        let mut history = History::start(AggregateId::new(), "a", Utc::now());
        history.push("b", Utc::now());
        history.push("c", Utc::now());

        let data: Vec<_> = history.iter().map(|v| v.data).collect();
        assert_eq!(data, vec!["a", "b", "c"]);

        let versions: Vec<_> = history.iter().map(|v| v.version().as_u64()).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(history.latest().data, "c");
    }

    #[test]
    fn get_addresses_each_version() {
        let mut history = History::start(AggregateId::new(), 10, Utc::now());
        history.push(20, Utc::now());
        history.push(30, Utc::now());

        assert_eq!(history.get(Version::new(1)).map(|v| v.data), Some(10));
        assert_eq!(history.get(Version::new(2)).map(|v| v.data), Some(20));
        assert_eq!(history.get(Version::new(3)).map(|v| v.data), Some(30));
        assert!(history.get(Version::new(0)).is_none());
        assert!(history.get(Version::new(4)).is_none());
    }
}
