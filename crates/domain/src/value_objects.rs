//! Value objects shared by contracts, customers and payments.

use common::uuid_id;
use serde::{Deserialize, Serialize};

uuid_id! {
    /// Unique identifier for a customer.
    CustomerId
}

uuid_id! {
    /// Identifier assigned to a payment by the payment service.
    PaymentId
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = 10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from whole currency units.
    pub fn from_units(units: i64) -> Self {
        Self { cents: units * 100 }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies by a count of billing periods.
    ///
    /// Returns None on overflow.
    pub fn checked_multiply(&self, count: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(count))
            .map(|cents| Money { cents })
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

/// How often a contract is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    Monthly,
    Quarterly,
    Yearly,
}

impl PaymentType {
    /// Number of months one payment covers.
    pub fn months(&self) -> u32 {
        match self {
            PaymentType::Monthly => 1,
            PaymentType::Quarterly => 3,
            PaymentType::Yearly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Monthly => "Monthly",
            PaymentType::Quarterly => "Quarterly",
            PaymentType::Yearly => "Yearly",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer's configured way of paying.
///
/// The variants are opaque references handed to the payment service; no
/// gateway integration lives in this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PaymentMethod {
    Card { last_four: String },
    PayPal { account: String },
    BankTransfer { iban: String },
    Invoice,
}

impl PaymentMethod {
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentMethod::Card { .. } => "Card",
            PaymentMethod::PayPal { .. } => "PayPal",
            PaymentMethod::BankTransfer { .. } => "BankTransfer",
            PaymentMethod::Invoice => "Invoice",
        }
    }
}
