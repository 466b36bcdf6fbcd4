//! Plan catalog read model: the latest known status of every plan.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DomainEvent, PlanId, PlanStatus};
use tokio::sync::RwLock;
use versioned_store::Version;

use crate::Result;
use crate::envelope::EventEnvelope;
use crate::projection::Projection;
use crate::read_model::ReadModel;

/// Catalog entry for a single plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalogEntry {
    pub plan_id: PlanId,
    pub version: Version,
    pub status: PlanStatus,
    pub updated_at: DateTime<Utc>,
}

/// Read model view of the plan catalog.
///
/// Applies plan events only when they carry a newer version than the one
/// already seen, so replays and duplicates leave the view unchanged.
#[derive(Clone, Default)]
pub struct PlanCatalogView {
    plans: Arc<RwLock<HashMap<PlanId, PlanCatalogEntry>>>,
}

impl PlanCatalogView {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the catalog entry for a plan.
    pub async fn get(&self, plan_id: PlanId) -> Option<PlanCatalogEntry> {
        self.plans.read().await.get(&plan_id).cloned()
    }

    /// Gets every plan offered at `now`.
    pub async fn active_at(&self, now: DateTime<Utc>) -> Vec<PlanCatalogEntry> {
        let mut active: Vec<_> = self
            .plans
            .read()
            .await
            .values()
            .filter(|entry| entry.status.is_active_at(now))
            .cloned()
            .collect();
        active.sort_by_key(|entry| entry.updated_at);
        active
    }

    /// Number of plans currently recorded.
    pub async fn len(&self) -> usize {
        self.plans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plans.read().await.is_empty()
    }
}

#[async_trait]
impl Projection<DomainEvent> for PlanCatalogView {
    fn name(&self) -> &'static str {
        "PlanCatalogView"
    }

    fn interested_in(&self, event: &DomainEvent) -> bool {
        event.plan_id().is_some()
    }

    async fn handle(&self, envelope: &EventEnvelope<DomainEvent>) -> Result<()> {
        let (plan, status) = match envelope.event {
            DomainEvent::PlanCreated { plan } => (plan, PlanStatus::NotLaunched),
            DomainEvent::PlanUpdated { plan, status } => (plan, status),
            DomainEvent::PlanLaunched { plan, at } => (plan, PlanStatus::Launched { at }),
            DomainEvent::PlanRetired {
                plan,
                valid_from,
                valid_until,
            } => (
                plan,
                PlanStatus::Retired {
                    valid_from,
                    valid_until,
                },
            ),
            DomainEvent::ContractCreated { .. }
            | DomainEvent::ContractRenewed { .. }
            | DomainEvent::ContractTerminated { .. } => return Ok(()),
        };

        let mut plans = self.plans.write().await;
        let entry = plans
            .entry(plan.aggregate_id)
            .or_insert_with(|| PlanCatalogEntry {
                plan_id: plan.aggregate_id,
                version: Version::new(0),
                status: PlanStatus::NotLaunched,
                updated_at: envelope.occurred_at,
            });

        if plan.version <= entry.version {
            tracing::debug!(plan_id = %plan.aggregate_id, version = %plan.version, "stale plan event ignored");
            return Ok(());
        }

        entry.version = plan.version;
        entry.updated_at = envelope.occurred_at;
        entry.status = status;
        Ok(())
    }
}

impl ReadModel for PlanCatalogView {
    fn name(&self) -> &'static str {
        "PlanCatalogView"
    }

    fn count(&self) -> usize {
        self.plans.try_read().map(|plans| plans.len()).unwrap_or(0)
    }
}
