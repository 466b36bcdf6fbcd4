//! Plan service providing the lifecycle API over a versioned store.

use chrono::{DateTime, Utc};
use versioned_store::{Versioned, VersionedId, VersionedStore, VersionedStoreExt};

use crate::error::DomainError;
use crate::events::{DomainEvent, EventPublisher};

use super::{LifecyclePolicy, Plan, PlanData, PlanId, PlanName, PlanStatus};

/// Service for managing insurance plans.
///
/// Every mutation goes through the store's atomic per-plan update and, once
/// committed, publishes the matching [`DomainEvent`].
pub struct PlanService<S, P> {
    store: S,
    publisher: P,
    policy: LifecyclePolicy,
}

impl<S, P> PlanService<S, P>
where
    S: VersionedStore<PlanData>,
    P: EventPublisher,
{
    /// Creates a plan service with the lenient lifecycle policy.
    pub fn new(store: S, publisher: P) -> Self {
        Self {
            store,
            publisher,
            policy: LifecyclePolicy::default(),
        }
    }

    /// Replaces the lifecycle policy.
    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a new, not yet launched plan.
    #[tracing::instrument(skip(self, name), fields(name = %name.as_ref()))]
    pub async fn create(&self, name: impl AsRef<str>) -> Result<Plan, DomainError> {
        let data = PlanData::new(PlanName::parse(name)?);
        let plan: Plan = self
            .store
            .append_then(data, |snapshot: &Versioned<PlanData>| {
                self.committed(DomainEvent::PlanCreated { plan: snapshot.id })
            })
            .await?
            .into();
        tracing::info!(plan_id = %plan.id(), "plan created");
        Ok(plan)
    }

    /// Creates a plan under a caller-chosen id.
    ///
    /// Fails with `DuplicateId` if the id is taken.
    #[tracing::instrument(skip(self, name))]
    pub async fn create_with_id(
        &self,
        plan_id: PlanId,
        name: impl AsRef<str>,
    ) -> Result<Plan, DomainError> {
        let data = PlanData::new(PlanName::parse(name)?);
        let plan = self
            .store
            .append_with_id_then(plan_id, data, |snapshot: &Versioned<PlanData>| {
                self.committed(DomainEvent::PlanCreated { plan: snapshot.id })
            })
            .await?;
        Ok(plan.into())
    }

    /// Renames a plan, keeping its status.
    #[tracing::instrument(skip(self, name))]
    pub async fn rename(&self, plan_id: PlanId, name: impl AsRef<str>) -> Result<Plan, DomainError> {
        let name = PlanName::parse(name)?;
        self.replace(plan_id, move |data| data.renamed(name)).await
    }

    /// Replaces the plan data wholesale as a new version.
    #[tracing::instrument(skip(self, data))]
    pub async fn update_data(&self, plan_id: PlanId, data: PlanData) -> Result<Plan, DomainError> {
        self.replace(plan_id, move |_| data).await
    }

    /// Launches a plan at `at`.
    #[tracing::instrument(skip(self))]
    pub async fn launch(&self, plan_id: PlanId, at: DateTime<Utc>) -> Result<Plan, DomainError> {
        let policy = self.policy;
        let plan: Plan = self
            .store
            .try_update_then(
                plan_id,
                move |data: &PlanData| policy.launch(data, at).map_err(DomainError::from),
                |snapshot: &Versioned<PlanData>| {
                    self.committed(DomainEvent::PlanLaunched {
                        plan: snapshot.id,
                        at,
                    })
                },
            )
            .await?
            .into();
        tracing::info!(plan_id = %plan.id(), version = %plan.version(), "plan launched");
        Ok(plan)
    }

    /// Retires a plan at `at`.
    #[tracing::instrument(skip(self))]
    pub async fn retire(&self, plan_id: PlanId, at: DateTime<Utc>) -> Result<Plan, DomainError> {
        let policy = self.policy;
        let plan: Plan = self
            .store
            .try_update_then(
                plan_id,
                move |data: &PlanData| policy.retire(data, at).map_err(DomainError::from),
                |snapshot: &Versioned<PlanData>| {
                    if let PlanStatus::Retired {
                        valid_from,
                        valid_until,
                    } = snapshot.data.status
                    {
                        self.committed(DomainEvent::PlanRetired {
                            plan: snapshot.id,
                            valid_from,
                            valid_until,
                        });
                    }
                },
            )
            .await?
            .into();
        tracing::info!(plan_id = %plan.id(), version = %plan.version(), "plan retired");
        Ok(plan)
    }

    /// Loads the latest version of a plan.
    pub async fn get_latest(&self, plan_id: PlanId) -> Result<Plan, DomainError> {
        Ok(self.store.get_latest(plan_id).await?.into())
    }

    /// Loads one exact version of a plan.
    pub async fn get_exact(&self, id: VersionedId) -> Result<Plan, DomainError> {
        Ok(self.store.get_exact(id).await?.into())
    }

    /// Loads every version of a plan, oldest first.
    pub async fn list_versions(&self, plan_id: PlanId) -> Result<Vec<Plan>, DomainError> {
        let versions = self.store.list_versions(plan_id).await?;
        Ok(versions.into_iter().map(Plan::from).collect())
    }

    /// Latest version of every plan that is offered at `now`.
    #[tracing::instrument(skip(self))]
    pub async fn list_active(&self, now: DateTime<Utc>) -> Vec<Plan> {
        self.store
            .list_latest_matching(move |data: &PlanData| data.status.is_active_at(now))
            .await
            .into_iter()
            .map(Plan::from)
            .collect()
    }

    async fn replace<F>(&self, plan_id: PlanId, f: F) -> Result<Plan, DomainError>
    where
        F: FnOnce(&PlanData) -> PlanData + Send,
    {
        let plan = self
            .store
            .try_update_then::<_, _, DomainError>(
                plan_id,
                move |data: &PlanData| Ok(f(data)),
                |snapshot: &Versioned<PlanData>| {
                    self.committed(DomainEvent::PlanUpdated {
                        plan: snapshot.id,
                        status: snapshot.data.status,
                    })
                },
            )
            .await?;
        Ok(plan.into())
    }

    /// Records and publishes an event. Called from store commit hooks, so
    /// events of one plan leave in version order.
    fn committed(&self, event: DomainEvent) {
        metrics::counter!("plan_events_emitted_total", "event_type" => event.event_type())
            .increment(1);
        self.publisher.publish(event);
    }
}
