//! Plan status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state of a plan in its lifecycle.
///
/// State transitions:
/// ```text
/// NotLaunched ──► Launched(at) ──► Retired(at, until)
///      │                                  ▲
///      └──────────────────────────────────┘  (degenerate: Retired(t, t))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "status")]
pub enum PlanStatus {
    /// Plan exists but has never been offered.
    #[default]
    NotLaunched,

    /// Plan is offered since `at`.
    Launched { at: DateTime<Utc> },

    /// Plan was offered from `valid_from` until `valid_until`.
    Retired {
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    },
}

impl PlanStatus {
    /// Status after launching at `at`.
    ///
    /// Overwrites any prior status; policy checks happen in
    /// [`LifecyclePolicy`](super::LifecyclePolicy).
    pub fn launch(&self, at: DateTime<Utc>) -> PlanStatus {
        PlanStatus::Launched { at }
    }

    /// Status after retiring at `at`.
    ///
    /// A launched plan keeps its launch time as the start of the validity
    /// interval. Any other status collapses to the zero-length interval
    /// `[at, at]`.
    pub fn retire(&self, at: DateTime<Utc>) -> PlanStatus {
        match *self {
            PlanStatus::Launched { at: from } => PlanStatus::Retired {
                valid_from: from,
                valid_until: at,
            },
            PlanStatus::NotLaunched | PlanStatus::Retired { .. } => PlanStatus::Retired {
                valid_from: at,
                valid_until: at,
            },
        }
    }

    /// Returns true if a plan with this status is offered at `now`.
    ///
    /// Both interval bounds are inclusive.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match *self {
            PlanStatus::NotLaunched => false,
            PlanStatus::Launched { at } => at <= now,
            PlanStatus::Retired {
                valid_from,
                valid_until,
            } => valid_from <= now && now <= valid_until,
        }
    }

    pub fn is_launched(&self) -> bool {
        matches!(self, PlanStatus::Launched { .. })
    }

    pub fn is_retired(&self) -> bool {
        matches!(self, PlanStatus::Retired { .. })
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::NotLaunched => "NotLaunched",
            PlanStatus::Launched { .. } => "Launched",
            PlanStatus::Retired { .. } => "Retired",
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
