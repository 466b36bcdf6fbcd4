use chrono::{DateTime, Utc};
use versioned_store::{Versioned, VersionedStore, VersionedStoreExt};

use crate::error::DomainError;
use crate::events::{DomainEvent, EventPublisher};

use super::{Contract, ContractData, ContractId};

/// Service for opening and maintaining contracts.
///
/// Mirrors [`PlanService`](crate::PlanService): events are published from the
/// store's commit hook, once the new version is in place and before the
/// contract is unlocked.
pub struct ContractService<S, P> {
    store: S,
    publisher: P,
}

impl<S, P> ContractService<S, P>
where
    S: VersionedStore<ContractData>,
    P: EventPublisher,
{
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores a new contract and publishes `ContractCreated`.
    #[tracing::instrument(skip(self, data), fields(customer_id = %data.customer_id, plan_id = %data.plan_id))]
    pub async fn open(&self, data: ContractData) -> Result<Contract, DomainError> {
        let contract: Contract = self
            .store
            .append_then(data, |snapshot: &Versioned<ContractData>| {
                self.committed(DomainEvent::ContractCreated {
                    contract_id: snapshot.aggregate_id(),
                })
            })
            .await?
            .into();
        tracing::info!(contract_id = %contract.id(), "contract opened");
        Ok(contract)
    }

    /// Moves the end of the contract period to `until`.
    #[tracing::instrument(skip(self))]
    pub async fn renew(
        &self,
        contract_id: ContractId,
        until: DateTime<Utc>,
    ) -> Result<Contract, DomainError> {
        let contract: Contract = self
            .store
            .try_update_then(
                contract_id,
                move |data: &ContractData| {
                    data.renewed(contract_id, until).map_err(DomainError::from)
                },
                |_: &Versioned<ContractData>| {
                    self.committed(DomainEvent::ContractRenewed {
                        contract_id,
                        valid_until: until,
                    })
                },
            )
            .await?
            .into();
        Ok(contract)
    }

    /// Terminates the contract at `at`.
    #[tracing::instrument(skip(self))]
    pub async fn terminate(
        &self,
        contract_id: ContractId,
        at: DateTime<Utc>,
    ) -> Result<Contract, DomainError> {
        let contract: Contract = self
            .store
            .try_update_then(
                contract_id,
                move |data: &ContractData| {
                    data.terminated(contract_id, at).map_err(DomainError::from)
                },
                |_: &Versioned<ContractData>| {
                    self.committed(DomainEvent::ContractTerminated { contract_id, at })
                },
            )
            .await?
            .into();
        tracing::info!(%contract_id, "contract terminated");
        Ok(contract)
    }

    /// Loads the latest version of a contract.
    pub async fn get(&self, contract_id: ContractId) -> Result<Contract, DomainError> {
        Ok(self.store.get_latest(contract_id).await?.into())
    }

    fn committed(&self, event: DomainEvent) {
        metrics::counter!("contract_events_emitted_total", "event_type" => event.event_type())
            .increment(1);
        self.publisher.publish(event);
    }
}
