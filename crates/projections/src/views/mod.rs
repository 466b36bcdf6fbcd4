//! Read model views built from domain events.

mod plan_catalog;

pub use plan_catalog::{PlanCatalogEntry, PlanCatalogView};
