//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{line_amount, round_money, MONEY_SCALE};
