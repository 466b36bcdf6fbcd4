//! Customer repository trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use domain::{Customer, CustomerId};

use crate::error::{PaymentError, Result};

/// Trait for loading customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Loads a customer. Fails with `NotFound`.
    async fn get_customer_by_id(&self, id: CustomerId) -> Result<Customer>;
}

#[derive(Debug, Default)]
struct InMemoryCustomerState {
    customers: HashMap<CustomerId, Customer>,
    unavailable: bool,
}

/// In-memory customer repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerRepository {
    state: Arc<RwLock<InMemoryCustomerState>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a customer.
    pub fn insert(&self, customer: Customer) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .customers
            .insert(customer.id, customer);
    }

    /// Makes every lookup fail with `CollaboratorFailure`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unavailable = unavailable;
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn get_customer_by_id(&self, id: CustomerId) -> Result<Customer> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.unavailable {
            return Err(PaymentError::unavailable("CustomerRepository"));
        }
        state
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Customer", id))
    }
}
