//! Application wiring for the plan lifecycle and payment services.
//!
//! [`App`] owns one instance of everything: the versioned stores behind the
//! plan and contract services, the event bus, the in-memory collaborators
//! and the running projections.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod walkthrough;

use std::sync::Arc;
use std::time::Duration;

use domain::{ContractData, ContractService, DomainEvent, PlanData, PlanService};
use payments::{
    InMemoryCustomerRepository, InMemoryPaymentMethodService, InMemoryPaymentService,
    InMemoryQuotingService, PaymentCreationProjection,
};
use projections::{EventBus, EventEnvelope, PlanCatalogView, ProjectionPosition, SubscriptionHandle};
use versioned_store::InMemoryVersionedStore;

pub use config::{Config, LogFormat};
pub use error::{AppError, Result};

pub type Plans = PlanService<InMemoryVersionedStore<PlanData>, EventBus<DomainEvent>>;
pub type Contracts = ContractService<InMemoryVersionedStore<ContractData>, EventBus<DomainEvent>>;

/// Shared application state.
pub struct App {
    pub config: Config,
    pub bus: EventBus<DomainEvent>,
    pub plans: Arc<Plans>,
    pub contracts: Arc<Contracts>,
    pub catalog: PlanCatalogView,
    pub customers: InMemoryCustomerRepository,
    pub payment_methods: InMemoryPaymentMethodService,
    pub quoting: InMemoryQuotingService,
    pub payments: InMemoryPaymentService,
    subscriptions: Vec<SubscriptionHandle>,
}

impl App {
    /// Builds the services and starts every projection.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(config: Config) -> Self {
        let bus = EventBus::with_config(config.bus);
        let plans = Arc::new(
            PlanService::new(InMemoryVersionedStore::new(), bus.clone())
                .with_policy(config.lifecycle_policy),
        );
        let contracts = Arc::new(ContractService::new(
            InMemoryVersionedStore::new(),
            bus.clone(),
        ));

        let catalog = PlanCatalogView::new();
        let customers = InMemoryCustomerRepository::new();
        let payment_methods = InMemoryPaymentMethodService::new();
        let quoting = InMemoryQuotingService::new();
        let payments = InMemoryPaymentService::new();

        let payment_projection = PaymentCreationProjection::new(
            Arc::clone(&contracts),
            customers.clone(),
            payment_methods.clone(),
            quoting.clone(),
            payments.clone(),
        );

        let subscriptions = vec![
            bus.subscribe_fn("event-log", |_| true, log_event),
            bus.subscribe(Arc::new(catalog.clone())),
            bus.subscribe(Arc::new(payment_projection)),
        ];
        metrics::gauge!("projection_subscriptions").set(subscriptions.len() as f64);

        tracing::info!(
            policy = %config.lifecycle_policy,
            bus_capacity = config.bus.capacity,
            subscriptions = subscriptions.len(),
            "application started"
        );

        Self {
            config,
            bus,
            plans,
            contracts,
            catalog,
            customers,
            payment_methods,
            quoting,
            payments,
            subscriptions,
        }
    }

    pub fn subscriptions(&self) -> &[SubscriptionHandle] {
        &self.subscriptions
    }

    /// Returns the subscription running the named projection.
    pub fn subscription(&self, name: &str) -> Option<&SubscriptionHandle> {
        self.subscriptions.iter().find(|h| h.name() == name)
    }

    /// Waits until every projection has received everything published so far.
    pub async fn drain(&self, within: Duration) -> Result<()> {
        let target = self.bus.last_sequence();
        if target == 0 {
            return Ok(());
        }
        tokio::time::timeout(within, async {
            for handle in &self.subscriptions {
                handle.wait_until_seen(target).await;
            }
        })
        .await
        .map_err(|_| AppError::DrainTimeout(within))
    }

    /// Cancels every projection and returns their final positions.
    pub async fn shutdown(self) -> Vec<(&'static str, ProjectionPosition)> {
        let mut positions = Vec::with_capacity(self.subscriptions.len());
        for handle in self.subscriptions {
            let name = handle.name();
            positions.push((name, handle.cancel().await));
        }
        metrics::gauge!("projection_subscriptions").set(0.0);
        tracing::info!("application stopped");
        positions
    }
}

async fn log_event(envelope: EventEnvelope<DomainEvent>) -> projections::Result<()> {
    tracing::info!(
        sequence = envelope.sequence,
        event_type = envelope.event.event_type(),
        aggregate_type = envelope.event.aggregate_type(),
        aggregate_id = %envelope.event.aggregate_id(),
        "domain event"
    );
    Ok(())
}
