//! Bill repository for bill and bill-item database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use khata_core::audit::{AuditAction, AuditEntityType, NewAuditRecord};
use khata_core::billing::{
    BillAuthorization, BillStatus, BillingError, BillingService, CreateBillInput, ResolvedBill,
};
use khata_shared::types::UserId;
use khata_shared::{AppError, RequestContext};

use crate::entities::{bill_items, bills, sea_orm_active_enums, vendors};
use crate::repositories::audit_log::AuditLogRepository;

/// Error types for bill operations.
#[derive(Debug, thiserror::Error)]
pub enum BillRepoError {
    /// The tenant already has a bill with this number.
    #[error("Duplicate bill number: {0}")]
    DuplicateBillNumber(String),

    /// Bill not found in this tenant.
    #[error("Bill not found: {0}")]
    NotFound(Uuid),

    /// The referenced vendor does not exist in this tenant.
    #[error("Vendor not found: {0}")]
    VendorNotFound(Uuid),

    /// A core billing rule rejected the operation.
    #[error(transparent)]
    Billing(#[from] BillingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BillRepoError> for AppError {
    fn from(err: BillRepoError) -> Self {
        match err {
            BillRepoError::DuplicateBillNumber(_) => Self::DuplicateKey(err.to_string()),
            BillRepoError::NotFound(id) => Self::NotFound(format!("bill {id}")),
            BillRepoError::VendorNotFound(id) => Self::NotFound(format!("vendor {id}")),
            BillRepoError::Billing(e) => e.into(),
            BillRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter options for listing bills.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    /// Substring match on the bill number.
    pub search: Option<String>,
    /// Filter by vendor.
    pub vendor_id: Option<Uuid>,
    /// Filter by lifecycle status.
    pub status: Option<BillStatus>,
    /// Filter by bill type.
    pub bill_type: Option<khata_core::billing::BillType>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
    /// Minimum bill total.
    pub amount_min: Option<Decimal>,
    /// Maximum bill total.
    pub amount_max: Option<Decimal>,
    /// Restrict to authorized rows (set for the organiser role).
    pub only_authorized: bool,
}

/// A bill together with its items.
#[derive(Debug, Clone)]
pub struct BillWithItems {
    /// Bill header.
    pub bill: bills::Model,
    /// Line items, in position order.
    pub items: Vec<bill_items::Model>,
}

/// Bill repository for CRUD and lifecycle operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    db: DatabaseConnection,
}

impl BillRepository {
    /// Creates a new bill repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a bill with its items and audit row in one transaction.
    ///
    /// The duplicate-number check runs inside the transaction; the
    /// tenant-scoped unique index backs it up under races.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate bill number, an unknown vendor,
    /// or a database failure.
    pub async fn create_bill(
        &self,
        ctx: &RequestContext,
        input: &CreateBillInput,
        resolved: &ResolvedBill,
    ) -> Result<BillWithItems, BillRepoError> {
        let tenant_id = ctx.tenant_id.into_inner();
        let vendor_id = input.vendor_id.into_inner();
        let txn = self.db.begin().await?;

        let vendor_known = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::Id.eq(vendor_id))
            .count(&txn)
            .await?
            > 0;
        if !vendor_known {
            return Err(BillRepoError::VendorNotFound(vendor_id));
        }

        let number_taken = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .filter(bills::Column::BillNumber.eq(input.bill_number.trim()))
            .count(&txn)
            .await?
            > 0;
        if number_taken {
            return Err(BillRepoError::DuplicateBillNumber(
                input.bill_number.trim().to_string(),
            ));
        }

        let now = chrono::Utc::now().into();
        let bill_id = Uuid::now_v7();

        let bill = bills::ActiveModel {
            id: Set(bill_id),
            tenant_id: Set(tenant_id),
            vendor_id: Set(vendor_id),
            bill_number: Set(input.bill_number.trim().to_string()),
            bill_date: Set(input.bill_date),
            bill_type: Set(input.bill_type.into()),
            status: Set(sea_orm_active_enums::BillStatus::Draft),
            amount_subtotal: Set(resolved.totals.subtotal),
            amount_tax: Set(resolved.totals.tax),
            amount_total: Set(resolved.totals.total),
            is_authorized: Set(false),
            authorized_by: Set(None),
            authorized_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let bill = bill.insert(&txn).await?;

        let items = Self::insert_items(&txn, bill_id, resolved).await?;

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::CreateBill,
            AuditEntityType::Bill,
            bill_id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(BillWithItems { bill, items })
    }

    /// Inserts resolved items in position order.
    async fn insert_items(
        txn: &DatabaseTransaction,
        bill_id: Uuid,
        resolved: &ResolvedBill,
    ) -> Result<Vec<bill_items::Model>, DbErr> {
        let now = chrono::Utc::now().into();
        let mut models = Vec::with_capacity(resolved.items.len());

        for (position, item) in resolved.items.iter().enumerate() {
            let row = bill_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                bill_id: Set(bill_id),
                position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                description: Set(item.description.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                amount: Set(item.amount),
                created_at: Set(now),
            };
            models.push(row.insert(txn).await?);
        }

        Ok(models)
    }

    /// Finds a bill by id within the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<bills::Model>, DbErr> {
        bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .filter(bills::Column::Id.eq(id))
            .one(&self.db)
            .await
    }

    /// Finds a bill with its items, in position order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_items(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<BillWithItems>, DbErr> {
        let Some(bill) = self.find_by_id(tenant_id, id).await? else {
            return Ok(None);
        };

        let items = bill_items::Entity::find()
            .filter(bill_items::Column::BillId.eq(id))
            .order_by_asc(bill_items::Column::Position)
            .all(&self.db)
            .await?;

        Ok(Some(BillWithItems { bill, items }))
    }

    /// Lists the tenant's bills, newest first, with optional filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &BillFilter,
    ) -> Result<Vec<bills::Model>, DbErr> {
        let mut query = bills::Entity::find().filter(bills::Column::TenantId.eq(tenant_id));

        if filter.only_authorized {
            query = query.filter(bills::Column::IsAuthorized.eq(true));
        }
        if let Some(search) = filter.search.as_deref() {
            if !search.is_empty() {
                query = query.filter(bills::Column::BillNumber.contains(search));
            }
        }
        if let Some(vendor_id) = filter.vendor_id {
            query = query.filter(bills::Column::VendorId.eq(vendor_id));
        }
        if let Some(status) = filter.status {
            let status: sea_orm_active_enums::BillStatus = status.into();
            query = query.filter(bills::Column::Status.eq(status));
        }
        if let Some(bill_type) = filter.bill_type {
            let bill_type: sea_orm_active_enums::BillType = bill_type.into();
            query = query.filter(bills::Column::BillType.eq(bill_type));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(bills::Column::BillDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(bills::Column::BillDate.lte(to));
        }
        if let Some(min) = filter.amount_min {
            query = query.filter(bills::Column::AmountTotal.gte(min));
        }
        if let Some(max) = filter.amount_max {
            query = query.filter(bills::Column::AmountTotal.lte(max));
        }

        query
            .order_by_desc(bills::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Transitions a bill's status, re-validating against the row's
    /// current state inside the transaction, and audits the change.
    ///
    /// # Arguments
    ///
    /// * `check` - The core lifecycle validator for this transition
    ///
    /// # Errors
    ///
    /// Returns an error if the bill is missing, the transition is not
    /// allowed, or the write fails.
    pub async fn update_status<F>(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        new_status: BillStatus,
        action: AuditAction,
        check: F,
    ) -> Result<bills::Model, BillRepoError>
    where
        F: FnOnce(BillStatus) -> Result<(), BillingError>,
    {
        let txn = self.db.begin().await?;

        let bill = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(ctx.tenant_id.into_inner()))
            .filter(bills::Column::Id.eq(id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(BillRepoError::NotFound(id))?;

        check(bill.status.clone().into())?;

        let mut model: bills::ActiveModel = bill.into();
        model.status = Set(new_status.into());
        model.updated_at = Set(chrono::Utc::now().into());
        let bill = model.update(&txn).await?;

        let audit = NewAuditRecord::from_ctx(ctx, action, AuditEntityType::Bill, id);
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(bill)
    }

    /// Grants or revokes the organiser-visibility flag, stamping or
    /// clearing `authorized_by`/`authorized_at` as a pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the bill is missing, the flag is already in
    /// the requested state, or the write fails.
    pub async fn set_authorization(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        grant: bool,
    ) -> Result<bills::Model, BillRepoError> {
        let txn = self.db.begin().await?;

        let bill = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(ctx.tenant_id.into_inner()))
            .filter(bills::Column::Id.eq(id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(BillRepoError::NotFound(id))?;

        let current = BillAuthorization {
            is_authorized: bill.is_authorized,
            authorized_by: bill.authorized_by.map(UserId::from_uuid),
            authorized_at: bill.authorized_at.map(Into::into),
        };

        let (next, action) = if grant {
            (
                BillingService::grant_authorization(&current, ctx.user_id, chrono::Utc::now())?,
                AuditAction::AuthorizeBill,
            )
        } else {
            (
                BillingService::revoke_authorization(&current)?,
                AuditAction::UnauthorizeBill,
            )
        };

        let mut model: bills::ActiveModel = bill.into();
        model.is_authorized = Set(next.is_authorized);
        model.authorized_by = Set(next.authorized_by.map(UserId::into_inner));
        model.authorized_at = Set(next.authorized_at.map(Into::into));
        model.updated_at = Set(chrono::Utc::now().into());
        let bill = model.update(&txn).await?;

        let audit = NewAuditRecord::from_ctx(ctx, action, AuditEntityType::Bill, id);
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(bill)
    }
}
