//! `SeaORM` entity definitions.

pub mod audit_logs;
pub mod bill_items;
pub mod bills;
pub mod credit_entries;
pub mod permissions;
pub mod proxy_bill_items;
pub mod proxy_bills;
pub mod role_permissions;
pub mod sea_orm_active_enums;
pub mod tenants;
pub mod vendors;
