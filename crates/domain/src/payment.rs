//! Payment records created from contracts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::ContractId;
use crate::value_objects::{CustomerId, Money, PaymentId, PaymentMethod, PaymentType};

/// Price offered for a contract by the quoting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Amount charged per billing period.
    pub amount: Money,
    pub payment_type: PaymentType,
}

/// Everything the payment service needs to set up a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentData {
    pub contract_id: ContractId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub payment_type: PaymentType,
    pub method: PaymentMethod,
}

impl PaymentData {
    /// Combines a quote with the parties and method it applies to.
    pub fn from_quote(
        contract_id: ContractId,
        customer_id: CustomerId,
        quote: Quote,
        method: PaymentMethod,
    ) -> Self {
        Self {
            contract_id,
            customer_id,
            amount: quote.amount,
            payment_type: quote.payment_type,
            method,
        }
    }
}

/// A payment as recorded by the payment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub data: PaymentData,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;

    #[test]
    fn test_payment_data_from_quote() {
        let contract_id = AggregateId::new();
        let customer_id = CustomerId::new();
        let quote = Quote {
            amount: Money::from_cents(4_200),
            payment_type: PaymentType::Quarterly,
        };

        let data = PaymentData::from_quote(contract_id, customer_id, quote, PaymentMethod::Invoice);
        assert_eq!(data.contract_id, contract_id);
        assert_eq!(data.customer_id, customer_id);
        assert_eq!(data.amount, quote.amount);
        assert_eq!(data.payment_type, PaymentType::Quarterly);
        assert_eq!(data.method, PaymentMethod::Invoice);
    }
}
