//! Policies deciding which status transitions a plan may take.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlanData, PlanError, PlanStatus};

/// Which transitions [`PlanService`](super::PlanService) accepts.
///
/// `Lenient` applies the raw transitions unconditionally: a retired plan may
/// be relaunched and a plan that never launched retires with a zero-length
/// interval. `Strict` only allows `NotLaunched -> Launched -> Retired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePolicy {
    #[default]
    Lenient,
    Strict,
}

impl LifecyclePolicy {
    /// Applies a launch at `at` to `data`, if the policy allows it.
    pub fn launch(&self, data: &PlanData, at: DateTime<Utc>) -> Result<PlanData, PlanError> {
        if *self == LifecyclePolicy::Strict && data.status.is_retired() {
            return Err(invalid(data.status, "launch"));
        }
        Ok(data.launched(at))
    }

    /// Applies a retirement at `at` to `data`, if the policy allows it.
    pub fn retire(&self, data: &PlanData, at: DateTime<Utc>) -> Result<PlanData, PlanError> {
        if *self == LifecyclePolicy::Strict && !data.status.is_launched() {
            return Err(invalid(data.status, "retire"));
        }
        Ok(data.retired(at))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePolicy::Lenient => "lenient",
            LifecyclePolicy::Strict => "strict",
        }
    }
}

fn invalid(status: PlanStatus, action: &'static str) -> PlanError {
    PlanError::InvalidTransition {
        current_state: status.as_str(),
        action,
    }
}

impl std::str::FromStr for LifecyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(LifecyclePolicy::Lenient),
            "strict" => Ok(LifecyclePolicy::Strict),
            other => Err(format!("unknown lifecycle policy: {other}")),
        }
    }
}

impl std::fmt::Display for LifecyclePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
