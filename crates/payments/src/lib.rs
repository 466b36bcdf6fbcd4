//! Payment creation for newly opened contracts.
//!
//! When a contract is created the [`PaymentCreationProjection`] runs these
//! steps, in order:
//! 1. Fetch the contract
//! 2. Fetch the customer it belongs to
//! 3. Fetch the customer's configured payment method
//! 4. Ask the quoting service for a price
//! 5. Create the payment
//!
//! A failing step aborts only the event being handled. Nothing is retried.

pub mod error;
pub mod projection;
pub mod services;

pub use error::{PaymentError, Result};
pub use projection::PaymentCreationProjection;
pub use services::{
    ContractRepository, CustomerPaymentMethodService, CustomerRepository,
    InMemoryCustomerRepository, InMemoryPaymentMethodService, InMemoryPaymentService,
    InMemoryQuotingService, PaymentService, QuotingService,
};
