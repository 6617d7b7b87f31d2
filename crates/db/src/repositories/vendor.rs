//! Vendor repository for vendor database operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use khata_core::audit::{AuditAction, AuditEntityType, NewAuditRecord};
use khata_core::vendor::{CreateVendorInput, VendorError, VendorService, VendorUsage};
use khata_shared::{AppError, RequestContext};

use crate::entities::{bills, credit_entries, proxy_bills, vendors};
use crate::repositories::audit_log::AuditLogRepository;

/// Error types for vendor operations.
#[derive(Debug, thiserror::Error)]
pub enum VendorRepoError {
    /// Vendor not found in this tenant.
    #[error("Vendor not found: {0}")]
    NotFound(Uuid),

    /// A core vendor rule rejected the operation.
    #[error(transparent)]
    Vendor(#[from] VendorError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<VendorRepoError> for AppError {
    fn from(err: VendorRepoError) -> Self {
        match err {
            VendorRepoError::NotFound(id) => Self::NotFound(format!("vendor {id}")),
            VendorRepoError::Vendor(e) => e.into(),
            VendorRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter options for listing vendors.
#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    /// Substring match on the vendor name.
    pub search: Option<String>,
    /// Minimum credit limit.
    pub credit_limit_min: Option<Decimal>,
    /// Maximum credit limit.
    pub credit_limit_max: Option<Decimal>,
}

/// Vendor repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    db: DatabaseConnection,
}

impl VendorRepository {
    /// Creates a new vendor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a vendor by id within the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<vendors::Model>, DbErr> {
        vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::Id.eq(id))
            .one(&self.db)
            .await
    }

    /// Returns true if a vendor with this id exists in the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DbErr> {
        let count = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Lists the tenant's vendors, name-ordered, with optional filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &VendorFilter,
    ) -> Result<Vec<vendors::Model>, DbErr> {
        let mut query = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id));

        if let Some(search) = filter.search.as_deref() {
            if !search.is_empty() {
                query = query.filter(vendors::Column::Name.contains(search));
            }
        }
        if let Some(min) = filter.credit_limit_min {
            query = query.filter(vendors::Column::CreditLimit.gte(min));
        }
        if let Some(max) = filter.credit_limit_max {
            query = query.filter(vendors::Column::CreditLimit.lte(max));
        }

        query
            .order_by_asc(vendors::Column::Name)
            .all(&self.db)
            .await
    }

    /// Checks whether a customer code is already used in the tenant,
    /// optionally excluding one vendor (for updates).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn customer_code_taken(
        &self,
        tenant_id: Uuid,
        code: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DbErr> {
        let mut query = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::CustomerCode.eq(code));
        if let Some(id) = exclude {
            query = query.filter(vendors::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    /// Checks whether a GST number is already used in the tenant,
    /// optionally excluding one vendor (for updates).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn gst_number_taken(
        &self,
        tenant_id: Uuid,
        gst: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DbErr> {
        let mut query = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::GstNumber.eq(gst));
        if let Some(id) = exclude {
            query = query.filter(vendors::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    /// Creates a vendor and its audit row in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or the audit write fails.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: &CreateVendorInput,
    ) -> Result<vendors::Model, VendorRepoError> {
        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let vendor_id = Uuid::now_v7();

        let vendor = vendors::ActiveModel {
            id: Set(vendor_id),
            tenant_id: Set(ctx.tenant_id.into_inner()),
            name: Set(input.name.trim().to_string()),
            contact_person: Set(input.contact_person.clone()),
            phone: Set(input.phone.clone()),
            address: Set(input.address.clone()),
            gst_number: Set(normalized(input.gst_number.as_deref())),
            customer_code: Set(normalized(input.customer_code.as_deref())),
            vendor_type: Set(input.vendor_type.into()),
            credit_limit: Set(input.credit_limit),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let vendor = vendor.insert(&txn).await?;

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::CreateVendor,
            AuditEntityType::Vendor,
            vendor_id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(vendor)
    }

    /// Updates a vendor's fields and audits the change in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `VendorRepoError::NotFound` for an unknown vendor, or a
    /// database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &CreateVendorInput,
    ) -> Result<vendors::Model, VendorRepoError> {
        let txn = self.db.begin().await?;

        let existing = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(ctx.tenant_id.into_inner()))
            .filter(vendors::Column::Id.eq(id))
            .one(&txn)
            .await?
            .ok_or(VendorRepoError::NotFound(id))?;

        let mut vendor: vendors::ActiveModel = existing.into();
        vendor.name = Set(input.name.trim().to_string());
        vendor.contact_person = Set(input.contact_person.clone());
        vendor.phone = Set(input.phone.clone());
        vendor.address = Set(input.address.clone());
        vendor.gst_number = Set(normalized(input.gst_number.as_deref()));
        vendor.customer_code = Set(normalized(input.customer_code.as_deref()));
        vendor.vendor_type = Set(input.vendor_type.into());
        vendor.credit_limit = Set(input.credit_limit);
        vendor.updated_at = Set(chrono::Utc::now().into());
        let vendor = vendor.update(&txn).await?;

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::UpdateVendor,
            AuditEntityType::Vendor,
            id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(vendor)
    }

    /// Counts the vendor's dependent records.
    ///
    /// # Errors
    ///
    /// Returns an error if any count query fails.
    pub async fn usage(&self, tenant_id: Uuid, vendor_id: Uuid) -> Result<VendorUsage, DbErr> {
        let bill_count = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .filter(bills::Column::VendorId.eq(vendor_id))
            .count(&self.db)
            .await?;
        let proxy_bill_count = proxy_bills::Entity::find()
            .filter(proxy_bills::Column::TenantId.eq(tenant_id))
            .filter(proxy_bills::Column::VendorId.eq(vendor_id))
            .count(&self.db)
            .await?;
        let credit_entry_count = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::VendorId.eq(vendor_id))
            .count(&self.db)
            .await?;

        Ok(VendorUsage {
            bill_count,
            proxy_bill_count,
            credit_entry_count,
        })
    }

    /// Deletes a vendor after re-checking the referential guard inside
    /// the transaction, and audits the deletion.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::HasDependents` (wrapped) when bills, proxy
    /// bills, or credit entries still reference the vendor.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), VendorRepoError> {
        let tenant_id = ctx.tenant_id.into_inner();
        let txn = self.db.begin().await?;

        let vendor = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .filter(vendors::Column::Id.eq(id))
            .one(&txn)
            .await?
            .ok_or(VendorRepoError::NotFound(id))?;

        // Re-check dependents inside the transaction so a concurrent
        // bill/credit insert cannot slip past the guard.
        let usage = VendorUsage {
            bill_count: bills::Entity::find()
                .filter(bills::Column::TenantId.eq(tenant_id))
                .filter(bills::Column::VendorId.eq(id))
                .count(&txn)
                .await?,
            proxy_bill_count: proxy_bills::Entity::find()
                .filter(proxy_bills::Column::TenantId.eq(tenant_id))
                .filter(proxy_bills::Column::VendorId.eq(id))
                .count(&txn)
                .await?,
            credit_entry_count: credit_entries::Entity::find()
                .filter(credit_entries::Column::TenantId.eq(tenant_id))
                .filter(credit_entries::Column::VendorId.eq(id))
                .count(&txn)
                .await?,
        };
        VendorService::validate_delete(&usage)?;

        vendors::Entity::delete_by_id(vendor.id).exec(&txn).await?;

        let audit = NewAuditRecord::from_ctx(
            ctx,
            AuditAction::DeleteVendor,
            AuditEntityType::Vendor,
            id,
        );
        AuditLogRepository::append(&txn, &audit).await?;

        txn.commit().await?;
        Ok(())
    }
}

/// Trims an optional code field, mapping blank to absent.
fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_blank_is_none() {
        assert_eq!(normalized(None), None);
        assert_eq!(normalized(Some("")), None);
        assert_eq!(normalized(Some("   ")), None);
        assert_eq!(normalized(Some(" C-42 ")), Some("C-42".to_string()));
    }
}
