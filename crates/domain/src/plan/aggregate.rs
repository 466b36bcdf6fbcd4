use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use versioned_store::{Version, Versioned, VersionedId};

use super::{PlanId, PlanName, PlanStatus};

/// The data a plan carries at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanData {
    pub name: PlanName,
    pub status: PlanStatus,
}

impl PlanData {
    /// Data for a plan that has not been launched yet.
    pub fn new(name: PlanName) -> Self {
        Self {
            name,
            status: PlanStatus::NotLaunched,
        }
    }

    pub fn launched(&self, at: DateTime<Utc>) -> Self {
        Self {
            name: self.name.clone(),
            status: self.status.launch(at),
        }
    }

    pub fn retired(&self, at: DateTime<Utc>) -> Self {
        Self {
            name: self.name.clone(),
            status: self.status.retire(at),
        }
    }

    pub fn renamed(&self, name: PlanName) -> Self {
        Self {
            name,
            status: self.status,
        }
    }
}

/// One immutable snapshot of an insurance plan.
///
/// As an entity a plan is identified by its [`PlanId`] alone: two versions of
/// the same plan compare equal and hash alike. Use [`Plan::same_snapshot`] to
/// compare the versioned contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    id: VersionedId,
    data: PlanData,
    recorded_at: DateTime<Utc>,
}

impl Plan {
    pub fn id(&self) -> PlanId {
        self.id.aggregate_id
    }

    pub fn versioned_id(&self) -> VersionedId {
        self.id
    }

    pub fn version(&self) -> Version {
        self.id.version
    }

    pub fn name(&self) -> &PlanName {
        &self.data.name
    }

    pub fn status(&self) -> PlanStatus {
        self.data.status
    }

    pub fn data(&self) -> &PlanData {
        &self.data
    }

    pub fn into_data(self) -> PlanData {
        self.data
    }

    /// When this version was recorded.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.data.status.is_active_at(now)
    }

    /// Structural comparison: same plan, same version, same data.
    pub fn same_snapshot(&self, other: &Plan) -> bool {
        self.id == other.id && self.data == other.data
    }
}

impl From<Versioned<PlanData>> for Plan {
    fn from(snapshot: Versioned<PlanData>) -> Self {
        Self {
            id: snapshot.id,
            data: snapshot.data,
            recorded_at: snapshot.recorded_at,
        }
    }
}

impl PartialEq for Plan {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Plan {}

impl Hash for Plan {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
