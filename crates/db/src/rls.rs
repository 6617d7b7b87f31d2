//! Row-Level Security (RLS) context management.
//!
//! This module provides utilities for setting `PostgreSQL` RLS context
//! per request to enforce multi-tenant data isolation. Every tenant-owned
//! table carries a policy keyed on the `app.current_tenant_id` session
//! variable; queries outside that tenant see no rows.

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use uuid::Uuid;

/// A database connection wrapper that sets RLS context for multi-tenant
/// isolation.
///
/// Wraps a database transaction and ensures the `app.current_tenant_id`
/// session variable is set before any queries are executed.
pub struct TenantConnection {
    txn: DatabaseTransaction,
}

impl TenantConnection {
    /// Creates a new RLS-enabled connection with the given tenant context.
    ///
    /// Begins a transaction and sets `app.current_tenant_id` using
    /// `SET LOCAL`, which scopes the setting to this transaction only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(db: &DatabaseConnection, tenant_id: Uuid) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_tenant_context(&txn, tenant_id).await?;
        Ok(Self { txn })
    }

    /// Returns a reference to the underlying transaction for executing
    /// queries subject to the tenant's RLS policies.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to easily create RLS-enabled
/// connections.
#[async_trait::async_trait]
pub trait TenantScopeExt {
    /// Creates an RLS-enabled connection with the given tenant context.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_tenant(&self, tenant_id: Uuid) -> Result<TenantConnection, DbErr>;
}

#[async_trait::async_trait]
impl TenantScopeExt for DatabaseConnection {
    async fn with_tenant(&self, tenant_id: Uuid) -> Result<TenantConnection, DbErr> {
        TenantConnection::new(self, tenant_id).await
    }
}

/// Sets the RLS context on an existing transaction.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_tenant_context(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
) -> Result<(), DbErr> {
    // UUIDs contain no quotable characters, so interpolation is safe here
    let sql = format!("SET LOCAL app.current_tenant_id = '{tenant_id}'");
    txn.execute_unprepared(&sql).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rls_sql_format() {
        let tenant_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let sql = format!("SET LOCAL app.current_tenant_id = '{tenant_id}'");
        assert_eq!(
            sql,
            "SET LOCAL app.current_tenant_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
