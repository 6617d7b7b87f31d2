//! Proxy bill repository for split and lifecycle database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use khata_core::audit::{AuditAction, AuditEntityType, NewAuditRecord};
use khata_core::billing::{BillStatus, BillingError};
use khata_core::proxy::ResolvedProxyBill;
use khata_shared::{AppError, RequestContext};

use crate::entities::{bills, proxy_bill_items, proxy_bills, sea_orm_active_enums};
use crate::repositories::audit_log::AuditLogRepository;

/// Error types for proxy bill operations.
#[derive(Debug, thiserror::Error)]
pub enum ProxyRepoError {
    /// The tenant already has a proxy bill with this number.
    #[error("Duplicate proxy number: {0}")]
    DuplicateProxyNumber(String),

    /// The parent bill does not exist in this tenant.
    #[error("Parent bill not found: {0}")]
    ParentNotFound(Uuid),

    /// Proxy bill not found in this tenant.
    #[error("Proxy bill not found: {0}")]
    NotFound(Uuid),

    /// A core billing rule rejected the operation.
    #[error(transparent)]
    Billing(#[from] BillingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ProxyRepoError> for AppError {
    fn from(err: ProxyRepoError) -> Self {
        match err {
            ProxyRepoError::DuplicateProxyNumber(_) => Self::DuplicateKey(err.to_string()),
            ProxyRepoError::ParentNotFound(id) => Self::NotFound(format!("bill {id}")),
            ProxyRepoError::NotFound(id) => Self::NotFound(format!("proxy bill {id}")),
            ProxyRepoError::Billing(e) => e.into(),
            ProxyRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A proxy bill together with its items.
#[derive(Debug, Clone)]
pub struct ProxyBillWithItems {
    /// Proxy bill header.
    pub proxy_bill: proxy_bills::Model,
    /// Line items, in position order.
    pub items: Vec<proxy_bill_items::Model>,
}

/// Proxy bill repository.
#[derive(Debug, Clone)]
pub struct ProxyBillRepository {
    db: DatabaseConnection,
}

impl ProxyBillRepository {
    /// Creates a new proxy bill repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persists a resolved split: all N proxy bills and their items in
    /// one transaction, plus a single SPLIT_BILL audit row on the
    /// parent. Nothing lands if any insert or check fails.
    ///
    /// # Errors
    ///
    /// Returns an error on an unknown parent, a duplicate proxy number,
    /// or a database failure.
    pub async fn create_split(
        &self,
        ctx: &RequestContext,
        parent_bill_id: Uuid,
        resolved: &[ResolvedProxyBill],
    ) -> Result<Vec<proxy_bills::Model>, ProxyRepoError> {
        let tenant_id = ctx.tenant_id.into_inner();
        let txn = self.db.begin().await?;

        let parent_known = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .filter(bills::Column::Id.eq(parent_bill_id))
            .count(&txn)
            .await?
            > 0;
        if !parent_known {
            return Err(ProxyRepoError::ParentNotFound(parent_bill_id));
        }

        let mut created = Vec::with_capacity(resolved.len());
        for proxy in resolved {
            created.push(Self::insert_proxy(&txn, tenant_id, parent_bill_id, proxy).await?);
        }

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::SplitBill,
            AuditEntityType::Bill,
            parent_bill_id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Persists a single standalone proxy bill with its own audit row.
    ///
    /// # Errors
    ///
    /// Returns an error on an unknown parent, a duplicate proxy number,
    /// or a database failure.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        parent_bill_id: Uuid,
        resolved: &ResolvedProxyBill,
    ) -> Result<proxy_bills::Model, ProxyRepoError> {
        let tenant_id = ctx.tenant_id.into_inner();
        let txn = self.db.begin().await?;

        let parent_known = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .filter(bills::Column::Id.eq(parent_bill_id))
            .count(&txn)
            .await?
            > 0;
        if !parent_known {
            return Err(ProxyRepoError::ParentNotFound(parent_bill_id));
        }

        let proxy = Self::insert_proxy(&txn, tenant_id, parent_bill_id, resolved).await?;

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::CreateProxyBill,
            AuditEntityType::ProxyBill,
            proxy.id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(proxy)
    }

    /// Inserts one proxy bill and its items, checking the tenant-scoped
    /// proxy number inside the transaction.
    async fn insert_proxy(
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        parent_bill_id: Uuid,
        resolved: &ResolvedProxyBill,
    ) -> Result<proxy_bills::Model, ProxyRepoError> {
        let number = resolved.proxy_number.trim();
        let number_taken = proxy_bills::Entity::find()
            .filter(proxy_bills::Column::TenantId.eq(tenant_id))
            .filter(proxy_bills::Column::ProxyNumber.eq(number))
            .count(txn)
            .await?
            > 0;
        if number_taken {
            return Err(ProxyRepoError::DuplicateProxyNumber(number.to_string()));
        }

        let now = chrono::Utc::now().into();
        let proxy_id = Uuid::now_v7();

        let proxy = proxy_bills::ActiveModel {
            id: Set(proxy_id),
            tenant_id: Set(tenant_id),
            parent_bill_id: Set(parent_bill_id),
            vendor_id: Set(resolved.vendor_id.into_inner()),
            proxy_number: Set(number.to_string()),
            status: Set(sea_orm_active_enums::BillStatus::Draft),
            amount_total: Set(resolved.amount_total),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let proxy = proxy.insert(txn).await?;

        for (position, item) in resolved.items.iter().enumerate() {
            let row = proxy_bill_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                proxy_bill_id: Set(proxy_id),
                position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                description: Set(item.description.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                amount: Set(item.amount),
                created_at: Set(now),
            };
            row.insert(txn).await?;
        }

        Ok(proxy)
    }

    /// Finds a proxy bill by id within the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<proxy_bills::Model>, DbErr> {
        proxy_bills::Entity::find()
            .filter(proxy_bills::Column::TenantId.eq(tenant_id))
            .filter(proxy_bills::Column::Id.eq(id))
            .one(&self.db)
            .await
    }

    /// Finds a proxy bill with its items, in position order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_items(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ProxyBillWithItems>, DbErr> {
        let Some(proxy_bill) = self.find_by_id(tenant_id, id).await? else {
            return Ok(None);
        };

        let items = proxy_bill_items::Entity::find()
            .filter(proxy_bill_items::Column::ProxyBillId.eq(id))
            .order_by_asc(proxy_bill_items::Column::Position)
            .all(&self.db)
            .await?;

        Ok(Some(ProxyBillWithItems { proxy_bill, items }))
    }

    /// Lists the tenant's proxy bills, newest first, optionally filtered
    /// to one parent bill.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        parent_bill_id: Option<Uuid>,
    ) -> Result<Vec<proxy_bills::Model>, DbErr> {
        let mut query =
            proxy_bills::Entity::find().filter(proxy_bills::Column::TenantId.eq(tenant_id));
        if let Some(parent) = parent_bill_id {
            query = query.filter(proxy_bills::Column::ParentBillId.eq(parent));
        }
        query
            .order_by_desc(proxy_bills::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Transitions a proxy bill's status, re-validating against the
    /// row's current state inside the transaction, and audits the
    /// change.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy bill is missing, the transition is
    /// not allowed, or the write fails.
    pub async fn update_status<F>(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        new_status: BillStatus,
        action: AuditAction,
        check: F,
    ) -> Result<proxy_bills::Model, ProxyRepoError>
    where
        F: FnOnce(BillStatus) -> Result<(), BillingError>,
    {
        let txn = self.db.begin().await?;

        let proxy = proxy_bills::Entity::find()
            .filter(proxy_bills::Column::TenantId.eq(ctx.tenant_id.into_inner()))
            .filter(proxy_bills::Column::Id.eq(id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ProxyRepoError::NotFound(id))?;

        check(proxy.status.clone().into())?;

        let mut model: proxy_bills::ActiveModel = proxy.into();
        model.status = Set(new_status.into());
        model.updated_at = Set(chrono::Utc::now().into());
        let proxy = model.update(&txn).await?;

        let audit = NewAuditRecord::from_ctx(ctx, action, AuditEntityType::ProxyBill, id);
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(proxy)
    }
}
