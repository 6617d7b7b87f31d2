//! Report repository: read-only reconciliation queries.
//!
//! These queries feed the reconciliation engine's pure functions; they
//! never mutate anything.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use khata_core::recon::{CollectionSummary, ReconService, VendorLedgerSnapshot};

use crate::entities::{bills, credit_entries, sea_orm_active_enums, vendors};

/// Tenant-wide dashboard counters.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    /// Vendors in the tenant.
    pub vendor_count: u64,
    /// Bills in the tenant.
    pub bill_count: u64,
    /// Tenant-wide outstanding balance.
    pub outstanding: Decimal,
}

/// One row of the per-vendor outstanding report.
#[derive(Debug, Clone)]
pub struct VendorOutstandingRow {
    /// The vendor.
    pub vendor: vendors::Model,
    /// Billed / incoming / outgoing sums.
    pub snapshot: VendorLedgerSnapshot,
    /// Net outstanding (billed - incoming + outgoing).
    pub outstanding: Decimal,
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the billed/incoming/outgoing snapshot for one vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn vendor_snapshot(
        &self,
        tenant_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<VendorLedgerSnapshot, DbErr> {
        let total_billed: Decimal = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .filter(bills::Column::VendorId.eq(vendor_id))
            .filter(bills::Column::Status.eq(sea_orm_active_enums::BillStatus::Confirmed))
            .all(&self.db)
            .await?
            .iter()
            .map(|b| b.amount_total)
            .sum();

        let entries = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::VendorId.eq(vendor_id))
            .all(&self.db)
            .await?;

        let (total_incoming, total_outgoing) = split_by_direction(&entries);

        Ok(VendorLedgerSnapshot {
            total_billed,
            total_incoming,
            total_outgoing,
        })
    }

    /// Builds the per-vendor outstanding report, skipping vendors with
    /// no billing activity and a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn outstanding_report(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<VendorOutstandingRow>, DbErr> {
        let vendor_list = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .all(&self.db)
            .await?;

        let mut rows = Vec::new();
        for vendor in vendor_list {
            let snapshot = self.vendor_snapshot(tenant_id, vendor.id).await?;
            let outstanding = ReconService::vendor_outstanding(&snapshot);

            if outstanding != Decimal::ZERO || snapshot.total_billed > Decimal::ZERO {
                rows.push(VendorOutstandingRow {
                    vendor,
                    snapshot,
                    outstanding,
                });
            }
        }

        Ok(rows)
    }

    /// Sums incoming and outgoing entries over a payment-date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn collection_summary(
        &self,
        tenant_id: Uuid,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<CollectionSummary, DbErr> {
        let entries = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .filter(credit_entries::Column::PaymentDate.gte(date_from))
            .filter(credit_entries::Column::PaymentDate.lte(date_to))
            .all(&self.db)
            .await?;

        let (total_incoming, total_outgoing) = split_by_direction(&entries);

        Ok(CollectionSummary {
            total_incoming,
            total_outgoing,
        })
    }

    /// Builds the tenant dashboard: counts plus tenant-wide
    /// outstanding.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn dashboard_stats(&self, tenant_id: Uuid) -> Result<DashboardStats, DbErr> {
        let vendor_count = vendors::Entity::find()
            .filter(vendors::Column::TenantId.eq(tenant_id))
            .count(&self.db)
            .await?;
        let bill_count = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .count(&self.db)
            .await?;

        let total_billed: Decimal = bills::Entity::find()
            .filter(bills::Column::TenantId.eq(tenant_id))
            .filter(bills::Column::Status.eq(sea_orm_active_enums::BillStatus::Confirmed))
            .all(&self.db)
            .await?
            .iter()
            .map(|b| b.amount_total)
            .sum();

        let entries = credit_entries::Entity::find()
            .filter(credit_entries::Column::TenantId.eq(tenant_id))
            .all(&self.db)
            .await?;
        let (total_incoming, total_outgoing) = split_by_direction(&entries);

        let outstanding = ReconService::vendor_outstanding(&VendorLedgerSnapshot {
            total_billed,
            total_incoming,
            total_outgoing,
        });

        Ok(DashboardStats {
            vendor_count,
            bill_count,
            outstanding,
        })
    }
}

/// Splits entry amounts into (incoming, outgoing) sums.
fn split_by_direction(entries: &[credit_entries::Model]) -> (Decimal, Decimal) {
    let mut incoming = Decimal::ZERO;
    let mut outgoing = Decimal::ZERO;
    for entry in entries {
        match entry.direction {
            sea_orm_active_enums::CreditDirection::Incoming => incoming += entry.amount,
            sea_orm_active_enums::CreditDirection::Outgoing => outgoing += entry.amount,
        }
    }
    (incoming, outgoing)
}
