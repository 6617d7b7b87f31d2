//! Bill domain logic: item resolution, monetary totals, and lifecycle rules.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::BillingError;
pub use service::BillingService;
pub use types::{
    BillAuthorization, BillItemInput, BillStatus, BillTotals, BillType, CreateBillInput,
    ResolvedBill, ResolvedItem,
};
