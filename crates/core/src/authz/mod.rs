//! Authorization gate decisions.
//!
//! Two independent checks, evaluated in order: the capability check
//! (role holds the permission code), then record-level visibility for
//! bills when the caller is the restricted role.

pub mod error;
pub mod service;

pub use error::AuthzError;
pub use service::AuthorizationGate;
