//! Permission repository: catalog reads and the sparse grant map.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use khata_core::audit::{AuditAction, AuditEntityType, NewAuditRecord};
use khata_core::permission::PermissionEngine;
use khata_shared::{AppError, RequestContext, Role};

use crate::entities::{permissions, role_permissions};
use crate::repositories::audit_log::AuditLogRepository;

/// Error types for permission operations.
#[derive(Debug, thiserror::Error)]
pub enum PermissionRepoError {
    /// The permission code is not in the catalog.
    #[error("Unknown permission code: {0}")]
    UnknownPermission(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PermissionRepoError> for AppError {
    fn from(err: PermissionRepoError) -> Self {
        match err {
            PermissionRepoError::UnknownPermission(_) => Self::NotFound(err.to_string()),
            PermissionRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Permission repository.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    db: DatabaseConnection,
}

impl PermissionRepository {
    /// Creates a new permission repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the permission catalog, grouped by category then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_catalog(&self) -> Result<Vec<permissions::Model>, DbErr> {
        permissions::Entity::find()
            .order_by_asc(permissions::Column::Category)
            .order_by_asc(permissions::Column::Name)
            .all(&self.db)
            .await
    }

    /// Loads the sparse grant map into a core `PermissionEngine`.
    ///
    /// Rows whose role string no longer parses are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_engine(&self) -> Result<PermissionEngine, DbErr> {
        let catalog = permissions::Entity::find().all(&self.db).await?;
        let code_by_id: HashMap<Uuid, String> =
            catalog.into_iter().map(|p| (p.id, p.code)).collect();

        let rows = role_permissions::Entity::find().all(&self.db).await?;
        let grants = rows.into_iter().filter_map(|row| {
            let role = Role::parse(&row.role)?;
            let code = code_by_id.get(&row.permission_id)?.clone();
            Some((role, code, row.granted))
        });

        Ok(PermissionEngine::from_rows(grants))
    }

    /// Upserts one grant row and audits the change.
    ///
    /// The superrole guard runs in the core engine before this is
    /// called; the repository only resolves the code and persists.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown code or a database failure.
    pub async fn set_grant(
        &self,
        ctx: &RequestContext,
        role: Role,
        code: &str,
        granted: bool,
    ) -> Result<(), PermissionRepoError> {
        let txn = self.db.begin().await?;

        let permission = permissions::Entity::find()
            .filter(permissions::Column::Code.eq(code))
            .one(&txn)
            .await?
            .ok_or_else(|| PermissionRepoError::UnknownPermission(code.to_string()))?;

        let now = chrono::Utc::now().into();
        let existing = role_permissions::Entity::find()
            .filter(role_permissions::Column::Role.eq(role.as_str()))
            .filter(role_permissions::Column::PermissionId.eq(permission.id))
            .one(&txn)
            .await?;

        if let Some(row) = existing {
            let mut model: role_permissions::ActiveModel = row.into();
            model.granted = Set(granted);
            model.updated_at = Set(now);
            model.update(&txn).await?;
        } else {
            let row = role_permissions::ActiveModel {
                id: Set(Uuid::now_v7()),
                role: Set(role.as_str().to_string()),
                permission_id: Set(permission.id),
                granted: Set(granted),
                created_at: Set(now),
                updated_at: Set(now),
            };
            row.insert(&txn).await?;
        }

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::UpdatePermissions,
            AuditEntityType::Permissions,
            permission.id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(())
    }
}
