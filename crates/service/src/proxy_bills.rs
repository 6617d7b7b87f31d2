//! Proxy bill operations.

use uuid::Uuid;

use khata_core::audit::AuditAction;
use khata_core::authz::AuthorizationGate;
use khata_core::billing::{BillStatus, BillingService};
use khata_core::proxy::{ProxyService, ProxySplitSpec};
use khata_db::entities::proxy_bills;
use khata_db::repositories::proxy_bill::ProxyBillWithItems;
use khata_db::repositories::{BillRepository, ProxyBillRepository, VendorRepository};
use khata_shared::{AppError, AppResult, RequestContext};

use crate::{db_err, Ledger};

/// Creates a single proxy bill off a parent bill.
///
/// # Errors
///
/// Returns `NotFound` for an unknown parent or vendor, `Validation` on
/// malformed items, or `DuplicateKey` on a proxy number collision.
pub async fn create_proxy_bill(
    state: &Ledger,
    ctx: &RequestContext,
    parent_bill_id: Uuid,
    spec: ProxySplitSpec,
) -> AppResult<proxy_bills::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "create_bill")?;

    let tenant_id = ctx.tenant_id.into_inner();
    let parent = BillRepository::new(state.db().clone())
        .find_by_id(tenant_id, parent_bill_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("bill {parent_bill_id}")))?;

    let vendor_exists = VendorRepository::new(state.db().clone())
        .exists(tenant_id, spec.vendor_id.into_inner())
        .await
        .map_err(db_err)?;

    let specs = vec![spec];
    let mut resolved =
        ProxyService::resolve_splits(parent.status.into(), &specs, |_| vendor_exists)?;
    let resolved = resolved.remove(0);

    Ok(ProxyBillRepository::new(state.db().clone())
        .create(ctx, parent_bill_id, &resolved)
        .await?)
}

/// Fetches a proxy bill with its items.
///
/// # Errors
///
/// Returns `NotFound` for an unknown proxy bill.
pub async fn get_proxy_bill(
    state: &Ledger,
    ctx: &RequestContext,
    proxy_bill_id: Uuid,
) -> AppResult<ProxyBillWithItems> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_bills")?;

    ProxyBillRepository::new(state.db().clone())
        .find_with_items(ctx.tenant_id.into_inner(), proxy_bill_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("proxy bill {proxy_bill_id}")))
}

/// Lists the tenant's proxy bills, optionally under one parent.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_bills` capability.
pub async fn list_proxy_bills(
    state: &Ledger,
    ctx: &RequestContext,
    parent_bill_id: Option<Uuid>,
) -> AppResult<Vec<proxy_bills::Model>> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_bills")?;

    ProxyBillRepository::new(state.db().clone())
        .list(ctx.tenant_id.into_inner(), parent_bill_id)
        .await
        .map_err(db_err)
}

/// Confirms a draft proxy bill. The proxy lifecycle is independent of
/// the parent bill's.
///
/// # Errors
///
/// Returns `Validation` unless the proxy bill is in draft.
pub async fn confirm_proxy_bill(
    state: &Ledger,
    ctx: &RequestContext,
    proxy_bill_id: Uuid,
) -> AppResult<proxy_bills::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "confirm_bill")?;

    Ok(ProxyBillRepository::new(state.db().clone())
        .update_status(
            ctx,
            proxy_bill_id,
            BillStatus::Confirmed,
            AuditAction::ConfirmProxyBill,
            BillingService::validate_can_confirm,
        )
        .await?)
}

/// Cancels a proxy bill.
///
/// # Errors
///
/// Returns `Validation` if the proxy bill is already cancelled.
pub async fn cancel_proxy_bill(
    state: &Ledger,
    ctx: &RequestContext,
    proxy_bill_id: Uuid,
) -> AppResult<proxy_bills::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "cancel_bill")?;

    Ok(ProxyBillRepository::new(state.db().clone())
        .update_status(
            ctx,
            proxy_bill_id,
            BillStatus::Cancelled,
            AuditAction::CancelProxyBill,
            BillingService::validate_can_cancel,
        )
        .await?)
}
