//! Domain events and the publishing seam.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};
use versioned_store::VersionedId;

use crate::contract::ContractId;
use crate::plan::{PlanId, PlanStatus};

/// Facts emitted after a store mutation has committed.
///
/// Events of one aggregate are published in version order.
///
/// Each variant carries only what downstream consumers need to look the
/// aggregate up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    PlanCreated {
        plan: VersionedId,
    },
    /// Name or data replaced; carries the status the new version holds.
    PlanUpdated {
        plan: VersionedId,
        status: PlanStatus,
    },
    PlanLaunched {
        plan: VersionedId,
        at: DateTime<Utc>,
    },
    PlanRetired {
        plan: VersionedId,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    },
    ContractCreated {
        contract_id: ContractId,
    },
    ContractRenewed {
        contract_id: ContractId,
        valid_until: DateTime<Utc>,
    },
    ContractTerminated {
        contract_id: ContractId,
        at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Returns the event type name, used for logging and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::PlanCreated { .. } => "PlanCreated",
            DomainEvent::PlanUpdated { .. } => "PlanUpdated",
            DomainEvent::PlanLaunched { .. } => "PlanLaunched",
            DomainEvent::PlanRetired { .. } => "PlanRetired",
            DomainEvent::ContractCreated { .. } => "ContractCreated",
            DomainEvent::ContractRenewed { .. } => "ContractRenewed",
            DomainEvent::ContractTerminated { .. } => "ContractTerminated",
        }
    }

    /// Returns the type of aggregate that emitted the event.
    pub fn aggregate_type(&self) -> &'static str {
        match self {
            DomainEvent::PlanCreated { .. }
            | DomainEvent::PlanUpdated { .. }
            | DomainEvent::PlanLaunched { .. }
            | DomainEvent::PlanRetired { .. } => "Plan",
            DomainEvent::ContractCreated { .. }
            | DomainEvent::ContractRenewed { .. }
            | DomainEvent::ContractTerminated { .. } => "Contract",
        }
    }

    /// Returns the id of the aggregate that emitted the event.
    pub fn aggregate_id(&self) -> AggregateId {
        match self {
            DomainEvent::PlanCreated { plan }
            | DomainEvent::PlanUpdated { plan, .. }
            | DomainEvent::PlanLaunched { plan, .. }
            | DomainEvent::PlanRetired { plan, .. } => plan.aggregate_id,
            DomainEvent::ContractCreated { contract_id }
            | DomainEvent::ContractRenewed { contract_id, .. }
            | DomainEvent::ContractTerminated { contract_id, .. } => *contract_id,
        }
    }

    /// Returns the plan id if this is a plan event.
    pub fn plan_id(&self) -> Option<PlanId> {
        (self.aggregate_type() == "Plan").then(|| self.aggregate_id())
    }
}

/// Sink for domain events.
///
/// Services call `publish` after the store mutation commits. Publishing never
/// waits for consumers.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DomainEvent);
}

impl<P> EventPublisher for Arc<P>
where
    P: EventPublisher + ?Sized,
{
    fn publish(&self, event: DomainEvent) {
        (**self).publish(event)
    }
}
