//! Projection creating a payment for every new contract.

use async_trait::async_trait;
use domain::{ContractId, DomainEvent, Payment, PaymentData};
use projections::{EventEnvelope, Projection, ProjectionError};

use crate::error::{PaymentError, Result};
use crate::services::{
    ContractRepository, CustomerPaymentMethodService, CustomerRepository, PaymentService,
    QuotingService,
};

/// Reacts to `ContractCreated` by setting up the contract's payment.
pub struct PaymentCreationProjection<C, R, M, Q, P> {
    contracts: C,
    customers: R,
    methods: M,
    quoting: Q,
    payments: P,
}

impl<C, R, M, Q, P> PaymentCreationProjection<C, R, M, Q, P>
where
    C: ContractRepository,
    R: CustomerRepository,
    M: CustomerPaymentMethodService,
    Q: QuotingService,
    P: PaymentService,
{
    pub fn new(contracts: C, customers: R, methods: M, quoting: Q, payments: P) -> Self {
        Self {
            contracts,
            customers,
            methods,
            quoting,
            payments,
        }
    }

    /// Runs the payment-creation steps for one contract.
    #[tracing::instrument(skip(self))]
    pub async fn process(&self, contract_id: ContractId) -> Result<Payment> {
        let outcome = self.run_steps(contract_id).await;
        match &outcome {
            Ok(payment) => {
                metrics::counter!("payments_created_total").increment(1);
                tracing::info!(
                    payment_id = %payment.id,
                    amount = %payment.data.amount,
                    payment_type = %payment.data.payment_type,
                    method = payment.data.method.kind(),
                    "payment created"
                );
            }
            Err(error) => {
                metrics::counter!("payments_failed_total", "reason" => error.kind()).increment(1);
            }
        }
        outcome
    }

    async fn run_steps(&self, contract_id: ContractId) -> Result<Payment> {
        tracing::debug!(step = "fetch_contract", "payment step started");
        let contract = self.contracts.get_contract(contract_id).await?;

        tracing::debug!(step = "fetch_customer", customer_id = %contract.customer_id(), "payment step started");
        let customer = self
            .customers
            .get_customer_by_id(contract.customer_id())
            .await?;

        tracing::debug!(step = "fetch_payment_method", "payment step started");
        let method = self.methods.get_method_for_customer(customer.id).await?;

        tracing::debug!(step = "quote", plan_id = %contract.plan_id(), "payment step started");
        let quote = self.quoting.quote_for_contract(contract.data()).await?;

        tracing::debug!(step = "create_payment", "payment step started");
        let data = PaymentData::from_quote(contract.id(), customer.id, quote, method);
        self.payments.create_payment(data).await
    }
}

#[async_trait]
impl<C, R, M, Q, P> Projection<DomainEvent> for PaymentCreationProjection<C, R, M, Q, P>
where
    C: ContractRepository,
    R: CustomerRepository,
    M: CustomerPaymentMethodService,
    Q: QuotingService,
    P: PaymentService,
{
    fn name(&self) -> &'static str {
        "PaymentCreationProjection"
    }

    fn interested_in(&self, event: &DomainEvent) -> bool {
        matches!(event, DomainEvent::ContractCreated { .. })
    }

    async fn handle(&self, envelope: &EventEnvelope<DomainEvent>) -> projections::Result<()> {
        let DomainEvent::ContractCreated { contract_id } = envelope.event else {
            return Ok(());
        };
        self.process(contract_id)
            .await
            .map(|_| ())
            .map_err(ProjectionError::from)
    }
}

impl From<PaymentError> for ProjectionError {
    fn from(error: PaymentError) -> Self {
        ProjectionError::handler(error)
    }
}
