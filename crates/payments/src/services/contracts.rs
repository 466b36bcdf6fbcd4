//! Contract lookup backed by the contract service.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{Contract, ContractData, ContractId, ContractService, EventPublisher};
use versioned_store::VersionedStore;

use crate::error::{PaymentError, Result};

/// Trait for loading contracts.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Loads the latest version of a contract. Fails with `NotFound`.
    async fn get_contract(&self, id: ContractId) -> Result<Contract>;
}

#[async_trait]
impl<S, P> ContractRepository for ContractService<S, P>
where
    S: VersionedStore<ContractData>,
    P: EventPublisher,
{
    async fn get_contract(&self, id: ContractId) -> Result<Contract> {
        self.get(id).await.map_err(|e| {
            if e.is_not_found() {
                PaymentError::not_found("Contract", id)
            } else {
                PaymentError::Domain(e)
            }
        })
    }
}

#[async_trait]
impl<R> ContractRepository for Arc<R>
where
    R: ContractRepository + ?Sized,
{
    async fn get_contract(&self, id: ContractId) -> Result<Contract> {
        (**self).get_contract(id).await
    }
}
