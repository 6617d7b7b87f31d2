//! Proxy bill split resolution.
//!
//! A bill can be split into N proxy bills, each with its own vendor,
//! number, items, and lifecycle. Resolution is all-or-nothing: one
//! malformed split rejects the whole batch.

pub mod error;
pub mod service;
pub mod types;

pub use error::ProxyError;
pub use service::ProxyService;
pub use types::{ProxySplitSpec, ResolvedProxyBill};
