use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::{
    AggregateId, History, Result, StoreError, Version, Versioned, VersionedId,
    store::VersionedStore,
};

/// Shared handle to one aggregate's history.
type HistoryCell<T> = Arc<Mutex<History<T>>>;

struct Index<T> {
    histories: HashMap<AggregateId, HistoryCell<T>>,
    /// Creation order of aggregates, used for listing.
    order: Vec<AggregateId>,
}

/// In-memory versioned store.
///
/// The index of aggregates sits behind a read/write lock that is only held
/// for lookups and inserts. Each history has its own mutex, so updates on one
/// aggregate serialize while updates on different aggregates proceed in
/// parallel.
pub struct InMemoryVersionedStore<T> {
    index: Arc<RwLock<Index<T>>>,
}

impl<T> InMemoryVersionedStore<T> {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            index: Arc::new(RwLock::new(Index {
                histories: HashMap::new(),
                order: Vec::new(),
            })),
        }
    }

    /// Returns the number of aggregates stored.
    pub async fn aggregate_count(&self) -> usize {
        self.index.read().await.order.len()
    }

    async fn history(&self, aggregate_id: AggregateId) -> Option<HistoryCell<T>> {
        self.index
            .read()
            .await
            .histories
            .get(&aggregate_id)
            .cloned()
    }
}

impl<T> Clone for InMemoryVersionedStore<T> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
        }
    }
}

impl<T> Default for InMemoryVersionedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> VersionedStore<T> for InMemoryVersionedStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn append_with_id_then<H>(
        &self,
        aggregate_id: AggregateId,
        data: T,
        on_commit: H,
    ) -> Result<Versioned<T>>
    where
        H: FnOnce(&Versioned<T>) + Send,
    {
        let mut index = self.index.write().await;
        if index.histories.contains_key(&aggregate_id) {
            return Err(StoreError::DuplicateId(aggregate_id));
        }

        let history = History::start(aggregate_id, data, Utc::now());
        let snapshot = history.latest().clone();
        index
            .histories
            .insert(aggregate_id, Arc::new(Mutex::new(history)));
        index.order.push(aggregate_id);

        metrics::counter!("store_versions_appended_total").increment(1);
        tracing::debug!(%aggregate_id, "aggregate history started");

        // Updates look the history up through the index, so they wait for
        // this hook too.
        on_commit(&snapshot);

        Ok(snapshot)
    }

    async fn try_update_then<F, H, E>(
        &self,
        aggregate_id: AggregateId,
        f: F,
        on_commit: H,
    ) -> std::result::Result<Versioned<T>, E>
    where
        F: FnOnce(&T) -> std::result::Result<T, E> + Send,
        H: FnOnce(&Versioned<T>) + Send,
        E: From<StoreError> + Send,
    {
        let cell = self
            .history(aggregate_id)
            .await
            .ok_or(StoreError::NotFound(aggregate_id))?;

        // Held across read, transform and append: this is the per-id
        // serialization point.
        let mut history = cell.lock().await;
        let next = f(&history.latest().data)?;
        let snapshot = history.push(next, Utc::now()).clone();

        metrics::counter!("store_versions_appended_total").increment(1);
        tracing::debug!(%aggregate_id, version = %snapshot.version(), "aggregate version appended");

        on_commit(&snapshot);
        drop(history);

        Ok(snapshot)
    }

    async fn get_latest(&self, aggregate_id: AggregateId) -> Result<Versioned<T>> {
        let cell = self
            .history(aggregate_id)
            .await
            .ok_or(StoreError::NotFound(aggregate_id))?;
        let history = cell.lock().await;
        Ok(history.latest().clone())
    }

    async fn get_exact(&self, id: VersionedId) -> Result<Versioned<T>> {
        let cell = self
            .history(id.aggregate_id)
            .await
            .ok_or(StoreError::UnknownAggregate(id.aggregate_id))?;
        let history = cell.lock().await;
        history
            .get(id.version)
            .cloned()
            .ok_or(StoreError::VersionNotFound {
                aggregate_id: id.aggregate_id,
                version: id.version,
            })
    }

    async fn list_versions(&self, aggregate_id: AggregateId) -> Result<Vec<Versioned<T>>> {
        let cell = self
            .history(aggregate_id)
            .await
            .ok_or(StoreError::NotFound(aggregate_id))?;
        let history = cell.lock().await;
        Ok(history.iter().cloned().collect())
    }

    async fn list_latest_matching<P>(&self, predicate: P) -> Vec<Versioned<T>>
    where
        P: Fn(&T) -> bool + Send,
    {
        let cells: Vec<HistoryCell<T>> = {
            let index = self.index.read().await;
            index
                .order
                .iter()
                .filter_map(|id| index.histories.get(id).cloned())
                .collect()
        };

        let mut latest = Vec::with_capacity(cells.len());
        for cell in cells {
            let history = cell.lock().await;
            if predicate(&history.latest().data) {
                latest.push(history.latest().clone());
            }
        }
        latest
    }

    async fn current_version(&self, aggregate_id: AggregateId) -> Option<Version> {
        let cell = self.history(aggregate_id).await?;
        let version = cell.lock().await.latest().version();
        Some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VersionedStoreExt;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Counter {
        label: String,
        value: u32,
    }

    fn counter(label: &str, value: u32) -> Counter {
        Counter {
            label: label.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn append_then_get_latest_returns_first_version() {
        let store = InMemoryVersionedStore::new();
        let created = store.append(counter("a", 1)).await.unwrap();

        let latest = store.get_latest(created.aggregate_id()).await.unwrap();
        assert_eq!(latest.version(), Version::first());
        assert_eq!(latest.data, counter("a", 1));
        assert_eq!(store.aggregate_count().await, 1);
    }

    #[tokio::test]
    async fn append_with_existing_id_is_duplicate() {
        let store = InMemoryVersionedStore::new();
        let id = AggregateId::new();
        store.append_with_id(id, counter("a", 1)).await.unwrap();

        let result = store.append_with_id(id, counter("b", 2)).await;
        assert_eq!(result, Err(StoreError::DuplicateId(id)));

        // The original history is untouched.
        let versions = store.list_versions(id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].data, counter("a", 1));
    }

    #[tokio::test]
    async fn updates_increment_version_by_one() {
        let store = InMemoryVersionedStore::new();
        let id = store.append(counter("a", 0)).await.unwrap().aggregate_id();

        for expected in 2..=5u64 {
            let updated = store
                .update(id, |c| Counter {
                    value: c.value + 1,
                    ..c.clone()
                })
                .await
                .unwrap();
            assert_eq!(updated.version(), Version::new(expected));
        }

        let versions = store.list_versions(id).await.unwrap();
        let values: Vec<_> = versions.iter().map(|v| v.data.value).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
        let numbers: Vec<_> = versions.iter().map(|v| v.version().as_u64()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = AggregateId::new();
        let result = store.update(id, |c| c.clone()).await;
        assert_eq!(result, Err(StoreError::NotFound(id)));
    }

    #[tokio::test]
    async fn rejected_update_appends_nothing() {
        #[derive(Debug, PartialEq)]
        enum Rejected {
            TooBig,
            Store(StoreError),
        }

        impl From<StoreError> for Rejected {
            fn from(e: StoreError) -> Self {
                Rejected::Store(e)
            }
        }

        let store = InMemoryVersionedStore::new();
        let id = store.append(counter("a", 10)).await.unwrap().aggregate_id();

        let result = store
            .try_update(id, |c: &Counter| {
                if c.value >= 10 {
                    Err(Rejected::TooBig)
                } else {
                    Ok(c.clone())
                }
            })
            .await;

        assert_eq!(result, Err(Rejected::TooBig));
        assert_eq!(store.current_version(id).await, Some(Version::first()));

        let missing = AggregateId::new();
        let result = store
            .try_update(missing, |c: &Counter| Ok::<_, Rejected>(c.clone()))
            .await;
        assert_eq!(result, Err(Rejected::Store(StoreError::NotFound(missing))));
    }

    #[tokio::test]
    async fn get_exact_distinguishes_unknown_aggregate_and_missing_version() {
        let store = InMemoryVersionedStore::new();
        let id = store.append(counter("a", 1)).await.unwrap().aggregate_id();
        store.update(id, |c| counter(&c.label, 2)).await.unwrap();

        let v1 = store
            .get_exact(VersionedId::new(id, Version::new(1)))
            .await
            .unwrap();
        assert_eq!(v1.data.value, 1);

        let missing_version = store.get_exact(VersionedId::new(id, Version::new(9))).await;
        assert_eq!(
            missing_version,
            Err(StoreError::VersionNotFound {
                aggregate_id: id,
                version: Version::new(9),
            })
        );

        let unknown = AggregateId::new();
        let missing_aggregate = store.get_exact(VersionedId::first(unknown)).await;
        assert_eq!(missing_aggregate, Err(StoreError::UnknownAggregate(unknown)));
    }

    #[tokio::test]
    async fn list_versions_of_unknown_id_is_not_found() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = AggregateId::new();
        assert_eq!(store.list_versions(id).await, Err(StoreError::NotFound(id)));
    }

    #[tokio::test]
    async fn list_latest_matching_uses_latest_data_in_creation_order() {
        let store = InMemoryVersionedStore::new();
        let a = store.append(counter("a", 1)).await.unwrap().aggregate_id();
        let b = store.append(counter("b", 5)).await.unwrap().aggregate_id();
        let c = store.append(counter("c", 7)).await.unwrap().aggregate_id();

        // `a` grows past the threshold, `c` drops below it.
        store.update(a, |x| counter(&x.label, 9)).await.unwrap();
        store.update(c, |x| counter(&x.label, 0)).await.unwrap();

        let big = store.list_latest_matching(|x| x.value > 3).await;
        let ids: Vec<_> = big.iter().map(|v| v.aggregate_id()).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(big[0].version(), Version::new(2));

        let all = store.list_latest().await;
        assert_eq!(all.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_on_same_id_never_lose_a_version() {
        let store = InMemoryVersionedStore::new();
        let id = store.append(counter("a", 0)).await.unwrap().aggregate_id();

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update(id, |c| Counter {
                            value: c.value + 1,
                            ..c.clone()
                        })
                        .await
                })
            })
            .collect();

        let results = futures_util::future::join_all(tasks).await;
        let successes = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(successes, 64);

        let versions = store.list_versions(id).await.unwrap();
        assert_eq!(versions.len(), 65);
        for (index, snapshot) in versions.iter().enumerate() {
            assert_eq!(snapshot.version().as_u64(), index as u64 + 1);
            assert_eq!(snapshot.data.value, index as u32);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn commit_hooks_run_in_version_order() {
        let store = InMemoryVersionedStore::new();
        let committed = Arc::new(std::sync::Mutex::new(Vec::new()));

        let record = Arc::clone(&committed);
        let id = store
            .append_then(counter("a", 0), move |snapshot| {
                record.lock().unwrap().push(snapshot.version())
            })
            .await
            .unwrap()
            .aggregate_id();

        let tasks: Vec<_> = (0..256)
            .map(|_| {
                let store = store.clone();
                let record = Arc::clone(&committed);
                tokio::spawn(async move {
                    store
                        .try_update_then::<_, _, StoreError>(
                            id,
                            |c| Ok(counter(&c.label, c.value + 1)),
                            move |snapshot| record.lock().unwrap().push(snapshot.version()),
                        )
                        .await
                })
            })
            .collect();
        for result in futures_util::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let committed = committed.lock().unwrap().clone();
        let expected: Vec<_> = (1..=257).map(Version::new).collect();
        assert_eq!(committed, expected);
    }

    #[tokio::test]
    async fn rejected_update_skips_commit_hook() {
        let store = InMemoryVersionedStore::new();
        let id = store.append(counter("a", 0)).await.unwrap().aggregate_id();
        let mut ran = false;

        let result = store
            .try_update_then(
                id,
                |_: &Counter| Err(StoreError::NotFound(id)),
                |_| ran = true,
            )
            .await;

        assert!(result.is_err());
        assert!(!ran);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn update_on_one_id_does_not_wait_for_another() {
        let store = InMemoryVersionedStore::new();
        let slow = store.append(counter("slow", 0)).await.unwrap().aggregate_id();
        let fast = store.append(counter("fast", 0)).await.unwrap().aggregate_id();

        // Hold the slow aggregate's history lock directly.
        let cell = store.history(slow).await.unwrap();
        let guard = cell.lock().await;

        let updated = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            store.update(fast, |c| counter(&c.label, 1)),
        )
        .await
        .expect("update of an unrelated aggregate blocked")
        .unwrap();
        assert_eq!(updated.version(), Version::new(2));

        drop(guard);
        assert_eq!(store.current_version(slow).await, Some(Version::first()));
    }
}
