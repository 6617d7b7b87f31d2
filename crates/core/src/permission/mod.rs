//! Permission catalog and role grant evaluation.
//!
//! The catalog is fixed reference data; grants are a sparse
//! `(role, permission code) -> granted` map with default-deny. The
//! administrative role is granted everything unconditionally and is
//! never looked up in the map.

pub mod catalog;
pub mod error;
pub mod service;

pub use catalog::{PermissionDef, CATALOG};
pub use error::PermissionError;
pub use service::PermissionEngine;
