//! Payment method lookup trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use domain::{CustomerId, PaymentMethod};

use crate::error::{PaymentError, Result};

/// Trait for finding how a customer pays.
#[async_trait]
pub trait CustomerPaymentMethodService: Send + Sync {
    /// Returns the customer's configured method. Fails with `NotConfigured`.
    async fn get_method_for_customer(&self, id: CustomerId) -> Result<PaymentMethod>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentMethodState {
    methods: HashMap<CustomerId, PaymentMethod>,
    unavailable: bool,
}

/// In-memory payment method registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentMethodService {
    state: Arc<RwLock<InMemoryPaymentMethodState>>,
}

impl InMemoryPaymentMethodService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method a customer pays with.
    pub fn configure(&self, customer_id: CustomerId, method: PaymentMethod) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .methods
            .insert(customer_id, method);
    }

    /// Removes a customer's method, returning it if there was one.
    pub fn remove(&self, customer_id: CustomerId) -> Option<PaymentMethod> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .methods
            .remove(&customer_id)
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
impl CustomerPaymentMethodService for InMemoryPaymentMethodService {
    async fn get_method_for_customer(&self, id: CustomerId) -> Result<PaymentMethod> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.unavailable {
            return Err(PaymentError::unavailable("CustomerPaymentMethodService"));
        }
        state
            .methods
            .get(&id)
            .cloned()
            .ok_or(PaymentError::NotConfigured(id))
    }
}
