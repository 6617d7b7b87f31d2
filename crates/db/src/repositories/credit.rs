//! Credit entry repository.
//!
//! Payments against a bill or proxy bill lock the container row for the
//! duration of the transaction, so the payment-cap check always runs
//! against a consistent `total_paid` snapshot. Two concurrent payments
//! serialize on the row lock; they can never jointly overshoot the
//! total.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::error;
use uuid::Uuid;

use khata_core::audit::{AuditAction, AuditEntityType, NewAuditRecord};
use khata_core::recon::{
    ContainerInfo, CreditDirection, CreditEntryInput, PaymentMethod, ReconError, ReconService,
};
use khata_shared::types::VendorId;
use khata_shared::{AppError, RequestContext};

use crate::entities::{bills, credit_entries, proxy_bills, sea_orm_active_enums, vendors};
use crate::repositories::audit_log::AuditLogRepository;

/// Error types for credit entry operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditRepoError {
    /// Credit entry not found in this tenant.
    #[error("Credit entry not found: {0}")]
    NotFound(Uuid),

    /// The referenced bill does not exist in this tenant.
    #[error("Bill not found: {0}")]
    BillNotFound(Uuid),

    /// The referenced proxy bill does not exist in this tenant.
    #[error("Proxy bill not found: {0}")]
    ProxyBillNotFound(Uuid),

    /// The referenced vendor does not exist in this tenant.
    #[error("Vendor not found: {0}")]
    VendorNotFound(Uuid),

    /// A reconciliation rule rejected the operation.
    #[error(transparent)]
    Recon(#[from] ReconError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CreditRepoError> for AppError {
    fn from(err: CreditRepoError) -> Self {
        match err {
            CreditRepoError::NotFound(id) => Self::NotFound(format!("credit entry {id}")),
            CreditRepoError::BillNotFound(id) => Self::NotFound(format!("bill {id}")),
            CreditRepoError::ProxyBillNotFound(id) => Self::NotFound(format!("proxy bill {id}")),
            CreditRepoError::VendorNotFound(id) => Self::NotFound(format!("vendor {id}")),
            CreditRepoError::Recon(e) => e.into(),
            CreditRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter options for listing credit entries.
#[derive(Debug, Clone, Default)]
pub struct CreditFilter {
    /// Substring match on the reference number.
    pub search: Option<String>,
    /// Filter by vendor.
    pub vendor_id: Option<Uuid>,
    /// Filter by direction.
    pub direction: Option<CreditDirection>,
    /// Filter by payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Filter by payment date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by payment date range end.
    pub date_to: Option<NaiveDate>,
    /// Minimum amount.
    pub amount_min: Option<Decimal>,
    /// Maximum amount.
    pub amount_max: Option<Decimal>,
}

/// Credit entry repository.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    db: DatabaseConnection,
}

impl CreditRepository {
    /// Creates a new credit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a credit entry, running the full reconciliation check
    /// against a locked container snapshot, and audits it in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, a referenced record is
    /// missing, or a write fails. An incoming payment that would push
    /// total paid past the container total is rejected with the store
    /// unchanged.
    pub async fn create_entry(
        &self,
        ctx: &RequestContext,
        input: &CreditEntryInput,
    ) -> Result<credit_entries::Model, CreditRepoError> {
        let tenant_id = ctx.tenant_id.into_inner();
        ReconService::validate_entry(input)?;

        let txn = self.db.begin().await?;

        let vendor_known = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::Id.eq(input.vendor_id.into_inner()))
            .count(&txn)
            .await?
            > 0;
        if !vendor_known {
            return Err(CreditRepoError::VendorNotFound(input.vendor_id.into_inner()));
        }

        Self::check_container(&txn, tenant_id, input, None).await?;

        let now = chrono::Utc::now().into();
        let entry_id = Uuid::now_v7();

        let entry = credit_entries::ActiveModel {
            id: Set(entry_id),
            tenant_id: Set(tenant_id),
            vendor_id: Set(input.vendor_id.into_inner()),
            bill_id: Set(input.bill_id.map(khata_shared::types::BillId::into_inner)),
            proxy_bill_id: Set(input
                .proxy_bill_id
                .map(khata_shared::types::ProxyBillId::into_inner)),
            amount: Set(input.amount),
            direction: Set(input.direction.into()),
            payment_method: Set(input.payment_method.into()),
            payment_date: Set(input.payment_date),
            reference_number: Set(input.reference_number.clone()),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let entry = entry.insert(&txn).await?;

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::CreateCredit,
            AuditEntityType::CreditEntry,
            entry_id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(entry)
    }

    /// Edits a credit entry through the explicit supersede path.
    ///
    /// The edit revalidates everything a create would: amount
    /// positivity, single container, vendor consistency, and the
    /// incoming cap recomputed with this entry excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or revalidation fails.
    pub async fn update_entry(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &CreditEntryInput,
    ) -> Result<credit_entries::Model, CreditRepoError> {
        let tenant_id = ctx.tenant_id.into_inner();
        ReconService::validate_entry(input)?;

        let txn = self.db.begin().await?;

        let existing = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::Id.eq(id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CreditRepoError::NotFound(id))?;

        let vendor_known = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::Id.eq(input.vendor_id.into_inner()))
            .count(&txn)
            .await?
            > 0;
        if !vendor_known {
            return Err(CreditRepoError::VendorNotFound(input.vendor_id.into_inner()));
        }

        Self::check_container(&txn, tenant_id, input, Some(id)).await?;

        let mut entry: credit_entries::ActiveModel = existing.into();
        entry.vendor_id = Set(input.vendor_id.into_inner());
        entry.bill_id = Set(input.bill_id.map(khata_shared::types::BillId::into_inner));
        entry.proxy_bill_id = Set(input
            .proxy_bill_id
            .map(khata_shared::types::ProxyBillId::into_inner));
        entry.amount = Set(input.amount);
        entry.direction = Set(input.direction.into());
        entry.payment_method = Set(input.payment_method.into());
        entry.payment_date = Set(input.payment_date);
        entry.reference_number = Set(input.reference_number.clone());
        entry.notes = Set(input.notes.clone());
        entry.updated_at = Set(chrono::Utc::now().into());
        let entry = entry.update(&txn).await?;

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::UpdateCredit,
            AuditEntityType::CreditEntry,
            id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(entry)
    }

    /// Locks the container (if any) and runs the reconciliation checks
    /// against a consistent snapshot.
    async fn check_container(
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        input: &CreditEntryInput,
        exclude_entry: Option<Uuid>,
    ) -> Result<(), CreditRepoError> {
        let container = if let Some(bill_id) = input.bill_id {
            let bill_id = bill_id.into_inner();
            let bill = bills::Entity::find()
                .filter(bills::Column::TenantId.eq(tenant_id))
                .filter(bills::Column::Id.eq(bill_id))
                .lock_exclusive()
                .one(txn)
                .await?
                .ok_or(CreditRepoError::BillNotFound(bill_id))?;
            Some((
                ContainerInfo {
                    amount_total: bill.amount_total,
                    status: bill.status.into(),
                    vendor_id: VendorId::from_uuid(bill.vendor_id),
                },
                credit_entries::Column::BillId.eq(bill_id),
            ))
        } else if let Some(proxy_id) = input.proxy_bill_id {
            let proxy_id = proxy_id.into_inner();
            let proxy = proxy_bills::Entity::find()
                .filter(proxy_bills::Column::TenantId.eq(tenant_id))
                .filter(proxy_bills::Column::Id.eq(proxy_id))
                .lock_exclusive()
                .one(txn)
                .await?
                .ok_or(CreditRepoError::ProxyBillNotFound(proxy_id))?;
            Some((
                ContainerInfo {
                    amount_total: proxy.amount_total,
                    status: proxy.status.into(),
                    vendor_id: VendorId::from_uuid(proxy.vendor_id),
                },
                credit_entries::Column::ProxyBillId.eq(proxy_id),
            ))
        } else {
            None
        };

        let Some((info, container_filter)) = container else {
            return Ok(());
        };

        ReconService::validate_container_vendor(input, &info)?;

        let mut query = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(container_filter)
            .filter(
                credit_entries::Column::Direction
                    .eq(sea_orm_active_enums::CreditDirection::Incoming),
            );
        if let Some(exclude) = exclude_entry {
            query = query.filter(credit_entries::Column::Id.ne(exclude));
        }
        let incoming: Vec<Decimal> = query
            .all(txn)
            .await?
            .into_iter()
            .map(|e| e.amount)
            .collect();
        let total_paid = ReconService::total_paid(&incoming);

        if let Err(e) =
            ReconService::validate_payment(&info, input.amount, input.direction, total_paid)
        {
            // An already-negative remaining is ledger corruption, not a
            // bad request; log it loudly before failing the operation.
            if e.is_bug_signal() {
                error!(error = %e, "reconciliation invariant violated");
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Sums incoming payments recorded against a bill.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn bill_total_paid(&self, tenant_id: Uuid, bill_id: Uuid) -> Result<Decimal, DbErr> {
        let incoming: Vec<Decimal> = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::BillId.eq(bill_id))
            .filter(
                credit_entries::Column::Direction
                    .eq(sea_orm_active_enums::CreditDirection::Incoming),
            )
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.amount)
            .collect();
        Ok(ReconService::total_paid(&incoming))
    }

    /// Sums incoming payments recorded against a proxy bill.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn proxy_total_paid(
        &self,
        tenant_id: Uuid,
        proxy_bill_id: Uuid,
    ) -> Result<Decimal, DbErr> {
        let incoming: Vec<Decimal> = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::ProxyBillId.eq(proxy_bill_id))
            .filter(
                credit_entries::Column::Direction
                    .eq(sea_orm_active_enums::CreditDirection::Incoming),
            )
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.amount)
            .collect();
        Ok(ReconService::total_paid(&incoming))
    }

    /// Finds a credit entry by id within the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<credit_entries::Model>, DbErr> {
        credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::Id.eq(id))
            .one(&self.db)
            .await
    }

    /// Lists the tenant's credit entries, newest payment first, with
    /// optional filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &CreditFilter,
    ) -> Result<Vec<credit_entries::Model>, DbErr> {
        let mut query =
            credit_entries::Entity::find().filter(credit_entries::Column::TenantId.eq(tenant_id));

        if let Some(search) = filter.search.as_deref() {
            if !search.is_empty() {
                query = query.filter(credit_entries::Column::ReferenceNumber.contains(search));
            }
        }
        if let Some(vendor_id) = filter.vendor_id {
            query = query.filter(credit_entries::Column::VendorId.eq(vendor_id));
        }
        if let Some(direction) = filter.direction {
            let direction: sea_orm_active_enums::CreditDirection = direction.into();
            query = query.filter(credit_entries::Column::Direction.eq(direction));
        }
        if let Some(method) = filter.payment_method {
            let method: sea_orm_active_enums::PaymentMethod = method.into();
            query = query.filter(credit_entries::Column::PaymentMethod.eq(method));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(credit_entries::Column::PaymentDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(credit_entries::Column::PaymentDate.lte(to));
        }
        if let Some(min) = filter.amount_min {
            query = query.filter(credit_entries::Column::Amount.gte(min));
        }
        if let Some(max) = filter.amount_max {
            query = query.filter(credit_entries::Column::Amount.lte(max));
        }

        query
            .order_by_desc(credit_entries::Column::PaymentDate)
            .all(&self.db)
            .await
    }

    /// Lists incoming credit entries recorded against a bill.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_bill(
        &self,
        tenant_id: Uuid,
        bill_id: Uuid,
    ) -> Result<Vec<credit_entries::Model>, DbErr> {
        credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::BillId.eq(bill_id))
            .order_by_desc(credit_entries::Column::PaymentDate)
            .all(&self.db)
            .await
    }
}
