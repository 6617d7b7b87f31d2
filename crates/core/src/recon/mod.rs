//! Payment reconciliation over the credit ledger.
//!
//! Pure, side-effect-free computation: payment totals, remaining
//! balances, payment status, and vendor outstanding are all derived from
//! snapshots of the credit ledger. The validation here is the only path
//! permitted to create a payment against a bill or proxy bill.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::ReconError;
pub use service::ReconService;
pub use types::{
    CollectionSummary, ContainerInfo, CreditDirection, CreditEntryInput, PaymentMethod,
    PaymentStatus, VendorLedgerSnapshot,
};
