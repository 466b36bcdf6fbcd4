//! Collaborator traits consumed by the payment projection, with in-memory
//! implementations.

pub mod contracts;
pub mod customers;
pub mod payment_methods;
pub mod payments;
pub mod quoting;

pub use contracts::ContractRepository;
pub use customers::{CustomerRepository, InMemoryCustomerRepository};
pub use payment_methods::{CustomerPaymentMethodService, InMemoryPaymentMethodService};
pub use payments::{InMemoryPaymentService, PaymentService};
pub use quoting::{InMemoryQuotingService, QuotingService};
