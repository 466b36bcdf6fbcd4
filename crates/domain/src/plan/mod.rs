//! Insurance plan aggregate and lifecycle rules.

mod aggregate;
mod lifecycle;
mod name;
mod service;
mod status;

pub use aggregate::{Plan, PlanData};
pub use lifecycle::LifecyclePolicy;
pub use name::PlanName;
pub use service::PlanService;
pub use status::PlanStatus;

use common::AggregateId;
use thiserror::Error;

/// Plans are addressed by their aggregate id.
pub type PlanId = AggregateId;

/// Errors that can occur during plan operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Plan name is empty after trimming.
    #[error("Plan name must not be empty")]
    EmptyName,

    /// Plan name exceeds the maximum length.
    #[error("Plan name is {length} characters long (maximum {max})")]
    NameTooLong { length: usize, max: usize },

    /// The lifecycle policy forbids the transition.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidTransition {
        current_state: &'static str,
        action: &'static str,
    },
}
