//! Audit record construction.
//!
//! The recorder itself lives in the persistence layer; the core defines
//! what a record is. Records are append-only: nothing in this system
//! updates or deletes one.

pub mod types;

pub use types::{AuditAction, AuditEntityType, NewAuditRecord};
