//! Audit log repository: append-only writes.
//!
//! A mutation that succeeds in the store but fails to audit must fail
//! overall, so `append` takes the caller's connection (usually an open
//! transaction) instead of opening its own.

use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use uuid::Uuid;

use khata_core::audit::NewAuditRecord;

use crate::entities::audit_logs;

/// Audit log repository.
pub struct AuditLogRepository;

impl AuditLogRepository {
    /// Appends one audit record on the given connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn append<C>(conn: &C, record: &NewAuditRecord) -> Result<audit_logs::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().into();

        let row = audit_logs::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(record.tenant_id.into_inner()),
            user_id: Set(record.user_id.into_inner()),
            action: Set(record.action.as_str().to_string()),
            entity_type: Set(record.entity_type.as_str().to_string()),
            entity_id: Set(record.entity_id),
            created_at: Set(now),
        };

        row.insert(conn).await
    }
}
