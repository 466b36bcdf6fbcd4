//! Quoting service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use domain::{ContractData, Money, PlanId, Quote};

use crate::error::{PaymentError, Result};

/// Trait for pricing contracts.
#[async_trait]
pub trait QuotingService: Send + Sync {
    /// Prices one billing period of the contract.
    async fn quote_for_contract(&self, data: &ContractData) -> Result<Quote>;
}

#[derive(Debug, Default)]
struct InMemoryQuotingState {
    monthly_rates: HashMap<PlanId, Money>,
    unavailable: bool,
}

/// Quotes from a fixed monthly rate per plan.
///
/// A contract billed every `n` months is quoted `n` times the monthly rate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuotingService {
    state: Arc<RwLock<InMemoryQuotingState>>,
}

impl InMemoryQuotingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_monthly_rate(&self, plan_id: PlanId, rate: Money) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .monthly_rates
            .insert(plan_id, rate);
    }

    /// Makes every quote fail with `CollaboratorFailure`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unavailable = unavailable;
    }
}

#[async_trait]
impl QuotingService for InMemoryQuotingService {
    async fn quote_for_contract(&self, data: &ContractData) -> Result<Quote> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.unavailable {
            return Err(PaymentError::unavailable("QuotingService"));
        }
        let rate = state
            .monthly_rates
            .get(&data.plan_id)
            .ok_or_else(|| PaymentError::not_found("Rate for plan", data.plan_id))?;

        let months = data.payment_type.months();
        let amount = rate
            .checked_multiply(months)
            .ok_or_else(|| PaymentError::CollaboratorFailure {
                service: "QuotingService",
                reason: format!("quote of {months} x {rate} overflows"),
            })?;

        Ok(Quote {
            amount,
            payment_type: data.payment_type,
        })
    }
}
