use serde::{Deserialize, Serialize};

use super::PlanError;

/// Validated, non-empty plan name.
///
/// The only way to obtain one is [`PlanName::parse`], so every `PlanData`
/// in the store carries a valid name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanName(String);

impl PlanName {
    /// Longest accepted name, in characters.
    pub const MAX_LEN: usize = 200;

    /// Trims surrounding whitespace and validates the result.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, PlanError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlanError::EmptyName);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LEN {
            return Err(PlanError::NameTooLong {
                length,
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlanName {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PlanName> for String {
    fn from(name: PlanName) -> Self {
        name.0
    }
}

impl AsRef<str> for PlanName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
