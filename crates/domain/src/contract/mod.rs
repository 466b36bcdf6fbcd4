//! Insurance contracts between a customer and a plan.

mod service;

pub use service::ContractService;

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use versioned_store::{Version, Versioned, VersionedId};

use crate::plan::PlanId;
use crate::value_objects::{CustomerId, PaymentType};

/// Contracts share the store's aggregate id space.
pub type ContractId = AggregateId;

/// Errors raised by contract transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("Contract {0} is already terminated")]
    AlreadyTerminated(ContractId),

    #[error("Contract period ends at {valid_until} before it starts at {valid_from}")]
    InvalidPeriod {
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    },
}

/// The data a contract carries at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractData {
    pub customer_id: CustomerId,
    pub plan_id: PlanId,
    pub payment_type: PaymentType,
    pub valid_from: DateTime<Utc>,
    /// Open-ended when `None`.
    pub valid_until: Option<DateTime<Utc>>,
    pub terminated_at: Option<DateTime<Utc>>,
}

impl ContractData {
    /// An open-ended contract starting at `valid_from`.
    pub fn new(
        customer_id: CustomerId,
        plan_id: PlanId,
        payment_type: PaymentType,
        valid_from: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id,
            plan_id,
            payment_type,
            valid_from,
            valid_until: None,
            terminated_at: None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated_at.is_some()
    }

    /// Returns true if the contract covers `now`.
    pub fn is_in_force_at(&self, now: DateTime<Utc>) -> bool {
        if self.valid_from > now {
            return false;
        }
        let end = match (self.valid_until, self.terminated_at) {
            (Some(until), Some(at)) => Some(until.min(at)),
            (until, at) => until.or(at),
        };
        end.is_none_or(|end| now <= end)
    }

    /// Extends or shortens the contract to end at `until`.
    pub fn renewed(&self, id: ContractId, until: DateTime<Utc>) -> Result<Self, ContractError> {
        if self.is_terminated() {
            return Err(ContractError::AlreadyTerminated(id));
        }
        if until < self.valid_from {
            return Err(ContractError::InvalidPeriod {
                valid_from: self.valid_from,
                valid_until: until,
            });
        }
        Ok(Self {
            valid_until: Some(until),
            ..self.clone()
        })
    }

    /// Ends the contract at `at`.
    pub fn terminated(&self, id: ContractId, at: DateTime<Utc>) -> Result<Self, ContractError> {
        if self.is_terminated() {
            return Err(ContractError::AlreadyTerminated(id));
        }
        Ok(Self {
            terminated_at: Some(at),
            ..self.clone()
        })
    }
}

/// One snapshot of a contract. Equality and hashing use the contract id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    id: VersionedId,
    data: ContractData,
}

impl Contract {
    pub fn id(&self) -> ContractId {
        self.id.aggregate_id
    }

    pub fn versioned_id(&self) -> VersionedId {
        self.id
    }

    pub fn version(&self) -> Version {
        self.id.version
    }

    pub fn data(&self) -> &ContractData {
        &self.data
    }

    pub fn customer_id(&self) -> CustomerId {
        self.data.customer_id
    }

    pub fn plan_id(&self) -> PlanId {
        self.data.plan_id
    }
}

impl From<Versioned<ContractData>> for Contract {
    fn from(snapshot: Versioned<ContractData>) -> Self {
        Self {
            id: snapshot.id,
            data: snapshot.data,
        }
    }
}

impl PartialEq for Contract {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Contract {}

impl Hash for Contract {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
