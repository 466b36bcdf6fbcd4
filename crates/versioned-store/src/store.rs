use async_trait::async_trait;

use crate::{AggregateId, Result, StoreError, Version, Versioned, VersionedId};

/// Core trait for versioned aggregate stores.
///
/// All implementations must be thread-safe (Send + Sync). Mutations of a
/// single aggregate are serialized; mutations of different aggregates must not
/// block each other.
#[async_trait]
pub trait VersionedStore<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts a new history for `aggregate_id` at version 1 and runs
    /// `on_commit` with the new snapshot before the aggregate is unlocked.
    ///
    /// Fails with `DuplicateId` if the id already has a history.
    async fn append_with_id_then<H>(
        &self,
        aggregate_id: AggregateId,
        data: T,
        on_commit: H,
    ) -> Result<Versioned<T>>
    where
        H: FnOnce(&Versioned<T>) + Send;

    /// Atomically reads the latest version, applies `f` and appends the result
    /// as the next version.
    ///
    /// `on_commit` runs with the appended snapshot while the aggregate is
    /// still locked, so hooks for one aggregate run in version order. It must
    /// not block. If `f` rejects the current data, nothing is appended, the
    /// hook is not run and the error is returned unchanged. Fails with
    /// `NotFound` if the id has no history.
    async fn try_update_then<F, H, E>(
        &self,
        aggregate_id: AggregateId,
        f: F,
        on_commit: H,
    ) -> std::result::Result<Versioned<T>, E>
    where
        F: FnOnce(&T) -> std::result::Result<T, E> + Send,
        H: FnOnce(&Versioned<T>) + Send,
        E: From<StoreError> + Send;

    /// Starts a new history for `aggregate_id` at version 1.
    ///
    /// Fails with `DuplicateId` if the id already has a history.
    async fn append_with_id(&self, aggregate_id: AggregateId, data: T) -> Result<Versioned<T>> {
        self.append_with_id_then(aggregate_id, data, |_| {}).await
    }

    /// [`try_update_then`](Self::try_update_then) without a commit hook.
    async fn try_update<F, E>(
        &self,
        aggregate_id: AggregateId,
        f: F,
    ) -> std::result::Result<Versioned<T>, E>
    where
        F: FnOnce(&T) -> std::result::Result<T, E> + Send,
        E: From<StoreError> + Send,
    {
        self.try_update_then(aggregate_id, f, |_| {}).await
    }

    /// Returns the latest snapshot of an aggregate.
    async fn get_latest(&self, aggregate_id: AggregateId) -> Result<Versioned<T>>;

    /// Returns one exact historical snapshot.
    ///
    /// Fails with `UnknownAggregate` if the id is absent and with
    /// `VersionNotFound` if only the version is.
    async fn get_exact(&self, id: VersionedId) -> Result<Versioned<T>>;

    /// Returns every snapshot of an aggregate, oldest first.
    async fn list_versions(&self, aggregate_id: AggregateId) -> Result<Vec<Versioned<T>>>;

    /// Returns the latest snapshot of every aggregate whose latest data
    /// satisfies `predicate`, in creation order.
    async fn list_latest_matching<P>(&self, predicate: P) -> Vec<Versioned<T>>
    where
        P: Fn(&T) -> bool + Send;

    /// Gets the current version of an aggregate.
    ///
    /// Returns None if the aggregate doesn't exist.
    async fn current_version(&self, aggregate_id: AggregateId) -> Option<Version>;
}

/// Extension trait providing convenience methods for versioned stores.
#[async_trait]
pub trait VersionedStoreExt<T>: VersionedStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts a history under a freshly generated id.
    ///
    /// Generated ids never collide, so this only fails if the implementation
    /// itself does.
    async fn append(&self, data: T) -> Result<Versioned<T>> {
        self.append_with_id(AggregateId::new(), data).await
    }

    /// Starts a history under a freshly generated id, running `on_commit`
    /// before the aggregate is unlocked.
    async fn append_then<H>(&self, data: T, on_commit: H) -> Result<Versioned<T>>
    where
        H: FnOnce(&Versioned<T>) + Send,
    {
        self.append_with_id_then(AggregateId::new(), data, on_commit)
            .await
    }

    /// Infallible-transform variant of [`VersionedStore::try_update`].
    async fn update<F>(&self, aggregate_id: AggregateId, f: F) -> Result<Versioned<T>>
    where
        F: FnOnce(&T) -> T + Send,
    {
        self.try_update::<_, StoreError>(aggregate_id, |data| Ok(f(data)))
            .await
    }

    /// Latest snapshot of every aggregate, in creation order.
    async fn list_latest(&self) -> Vec<Versioned<T>> {
        self.list_latest_matching(|_| true).await
    }

    /// Checks if an aggregate has any history.
    async fn exists(&self, aggregate_id: AggregateId) -> bool {
        self.current_version(aggregate_id).await.is_some()
    }
}

// Blanket implementation for all VersionedStore implementations
impl<T, S> VersionedStoreExt<T> for S
where
    T: Clone + Send + Sync + 'static,
    S: VersionedStore<T> + ?Sized,
{
}
