//! Event bus and projections for the plan and contract domain.
//!
//! This crate provides the consuming side of the domain events:
//! - [`EventBus`] broadcasting [`EventEnvelope`]s to every subscriber
//! - [`Projection`] trait for consumers, run on their own task
//! - [`SubscriptionHandle`] for observing and cancelling a running projection
//! - [`PlanCatalogView`] read model of the latest known plan statuses

pub mod bus;
pub mod envelope;
pub mod error;
pub mod projection;
pub mod read_model;
mod runner;
pub mod views;

pub use bus::{BusConfig, EventBus};
pub use envelope::EventEnvelope;
pub use error::{ProjectionError, Result};
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use runner::{ProjectionFailure, SubscriptionHandle};
pub use views::{PlanCatalogEntry, PlanCatalogView};
