//! Shared types, errors, and configuration for Khata.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers with decimal precision
//! - Typed IDs for type-safe entity references
//! - The request identity context and role enumeration
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use context::{RequestContext, Role};
pub use error::{AppError, AppResult};
