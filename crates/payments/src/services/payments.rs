//! Payment service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use domain::{ContractId, Payment, PaymentData, PaymentId};

use crate::error::{PaymentError, Result};

/// Trait for creating payments.
#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_payment(&self, data: PaymentData) -> Result<Payment>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: Vec<Payment>,
    unavailable: bool,
}

/// In-memory payment service recording every created payment.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of payments created.
    pub fn payment_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .payments
            .len()
    }

    /// Returns the payments created for a contract, oldest first.
    pub fn payments_for_contract(&self, contract_id: ContractId) -> Vec<Payment> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .payments
            .iter()
            .filter(|p| p.data.contract_id == contract_id)
            .cloned()
            .collect()
    }

    /// Makes payment creation fail with `CollaboratorFailure`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unavailable = unavailable;
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn create_payment(&self, data: PaymentData) -> Result<Payment> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.unavailable {
            return Err(PaymentError::unavailable("PaymentService"));
        }

        let payment = Payment {
            id: PaymentId::new(),
            data,
            created_at: Utc::now(),
        };
        state.payments.push(payment.clone());
        Ok(payment)
    }
}
