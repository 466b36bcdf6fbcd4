//! Domain layer: insurance plans, contracts and the events they emit.
//!
//! This crate provides:
//! - [`Plan`] with its validated name and status state machine
//! - [`PlanService`] applying lifecycle transitions through a versioned store
//! - [`Contract`] and [`ContractService`] producing contract events
//! - Customer and payment value objects consumed by projections
//! - [`DomainEvent`] and the [`EventPublisher`] seam to the event bus

pub mod contract;
pub mod customer;
pub mod error;
pub mod events;
pub mod payment;
pub mod plan;
pub mod value_objects;

pub use common::AggregateId;
pub use contract::{Contract, ContractData, ContractError, ContractId, ContractService};
pub use customer::Customer;
pub use error::DomainError;
pub use events::{DomainEvent, EventPublisher};
pub use payment::{Payment, PaymentData, Quote};
pub use plan::{
    LifecyclePolicy, Plan, PlanData, PlanError, PlanId, PlanName, PlanService, PlanStatus,
};
pub use value_objects::{CustomerId, Money, PaymentId, PaymentMethod, PaymentType};
