//! Reporting operations: read-only views over the ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use khata_core::authz::AuthorizationGate;
use khata_core::recon::{CollectionSummary, ReconService};
use khata_db::repositories::report::{DashboardStats, VendorOutstandingRow};
use khata_db::repositories::ReportRepository;
use khata_shared::{AppResult, RequestContext};

use crate::{db_err, Ledger};

/// Date-ranged collection report.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    /// Range start.
    pub date_from: NaiveDate,
    /// Range end.
    pub date_to: NaiveDate,
    /// Incoming/outgoing sums.
    pub summary: CollectionSummary,
    /// Incoming minus outgoing.
    pub net: Decimal,
}

/// Per-vendor outstanding balances.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_reports` capability.
pub async fn outstanding_report(
    state: &Ledger,
    ctx: &RequestContext,
) -> AppResult<Vec<VendorOutstandingRow>> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_reports")?;

    ReportRepository::new(state.db().clone())
        .outstanding_report(ctx.tenant_id.into_inner())
        .await
        .map_err(db_err)
}

/// Net outstanding for a single vendor.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_reports` capability.
pub async fn vendor_outstanding(
    state: &Ledger,
    ctx: &RequestContext,
    vendor_id: Uuid,
) -> AppResult<Decimal> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_reports")?;

    let snapshot = ReportRepository::new(state.db().clone())
        .vendor_snapshot(ctx.tenant_id.into_inner(), vendor_id)
        .await
        .map_err(db_err)?;

    Ok(ReconService::vendor_outstanding(&snapshot))
}

/// Incoming/outgoing/net over a payment-date range.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_reports` capability.
pub async fn collection_report(
    state: &Ledger,
    ctx: &RequestContext,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> AppResult<CollectionReport> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_reports")?;

    let summary = ReportRepository::new(state.db().clone())
        .collection_summary(ctx.tenant_id.into_inner(), date_from, date_to)
        .await
        .map_err(db_err)?;
    let net = ReconService::collection_net(&summary);

    Ok(CollectionReport {
        date_from,
        date_to,
        summary,
        net,
    })
}

/// Tenant dashboard counters and outstanding total.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_reports` capability.
pub async fn dashboard_stats(state: &Ledger, ctx: &RequestContext) -> AppResult<DashboardStats> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_reports")?;

    ReportRepository::new(state.db().clone())
        .dashboard_stats(ctx.tenant_id.into_inner())
        .await
        .map_err(db_err)
}
