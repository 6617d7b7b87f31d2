//! Bill operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::error;
use uuid::Uuid;

use khata_core::audit::AuditAction;
use khata_core::authz::AuthorizationGate;
use khata_core::billing::{
    BillAuthorization, BillStatus, BillTotals, BillingService, CreateBillInput, ResolvedBill,
};
use khata_core::proxy::{ProxyService, ProxySplitSpec};
use khata_core::recon::{
    CreditDirection, CreditEntryInput, PaymentMethod, PaymentStatus, ReconService,
};
use khata_db::entities::{bills, proxy_bills};
use khata_db::repositories::bill::{BillFilter, BillWithItems};
use khata_db::repositories::{BillRepository, CreditRepository, ProxyBillRepository};
use khata_shared::types::{BillId, UserId, VendorId};
use khata_shared::{AppError, AppResult, RequestContext};

use crate::{db_err, Ledger};

/// An initial payment recorded together with bill creation.
#[derive(Debug, Clone)]
pub struct InitialPayment {
    /// Amount received; `None` means the full bill total.
    pub amount: Option<Decimal>,
    /// How it was paid.
    pub payment_method: PaymentMethod,
    /// When it was paid; `None` means the bill date.
    pub payment_date: Option<NaiveDate>,
    /// Optional payment reference.
    pub reference_number: Option<String>,
}

/// Request to create a bill, optionally with an initial payment.
#[derive(Debug, Clone)]
pub struct CreateBillRequest {
    /// The bill fields and items.
    pub bill: CreateBillInput,
    /// Optional payment recorded in the same operation.
    pub initial_payment: Option<InitialPayment>,
}

/// A bill with its items and derived reconciliation state.
#[derive(Debug, Clone)]
pub struct BillDetail {
    /// The bill with its items.
    pub bill: BillWithItems,
    /// Sum of incoming payments.
    pub total_paid: Decimal,
    /// Total minus paid.
    pub remaining: Decimal,
    /// Derived payment status.
    pub payment_status: PaymentStatus,
}

/// Creates a bill (and optionally its first payment) behind the gate.
///
/// # Errors
///
/// Returns `Forbidden` without `create_bill`, `Validation` on malformed
/// items, `DuplicateKey` on a bill number collision, or `NotFound` for
/// an unknown vendor.
pub async fn create_bill(
    state: &Ledger,
    ctx: &RequestContext,
    request: CreateBillRequest,
) -> AppResult<BillWithItems> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "create_bill")?;

    let resolved: ResolvedBill = BillingService::validate_and_resolve(&request.bill)?;

    let repo = BillRepository::new(state.db().clone());
    let created = repo.create_bill(ctx, &request.bill, &resolved).await?;

    if let Some(payment) = request.initial_payment {
        let amount = payment.amount.unwrap_or(created.bill.amount_total);
        let input = CreditEntryInput {
            vendor_id: VendorId::from_uuid(created.bill.vendor_id),
            bill_id: Some(BillId::from_uuid(created.bill.id)),
            proxy_bill_id: None,
            amount,
            direction: CreditDirection::Incoming,
            payment_method: payment.payment_method,
            payment_date: payment.payment_date.unwrap_or(created.bill.bill_date),
            reference_number: payment.reference_number,
            notes: Some(format!("Payment for bill {}", created.bill.bill_number)),
        };
        CreditRepository::new(state.db().clone())
            .create_entry(ctx, &input)
            .await?;
    }

    Ok(created)
}

/// Fetches a bill with its reconciliation state.
///
/// For the organiser role an unauthorized bill is reported as
/// `NotFound`, exactly as if it did not exist.
///
/// # Errors
///
/// Returns `NotFound` for an unknown (or hidden) bill, or
/// `InvariantViolation` if the stored monetary triple drifted.
pub async fn get_bill(
    state: &Ledger,
    ctx: &RequestContext,
    bill_id: Uuid,
) -> AppResult<BillDetail> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_bills")?;

    let repo = BillRepository::new(state.db().clone());
    let with_items = repo
        .find_with_items(ctx.tenant_id.into_inner(), bill_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("bill {bill_id}")))?;

    AuthorizationGate::ensure_bill_visible(ctx, with_items.bill.is_authorized)?;

    detail_for(state, ctx, with_items).await
}

/// Derives the reconciliation state for a fetched bill, surfacing any
/// stored-invariant drift as a bug signal.
async fn detail_for(
    state: &Ledger,
    ctx: &RequestContext,
    with_items: BillWithItems,
) -> AppResult<BillDetail> {
    let totals = BillTotals {
        subtotal: with_items.bill.amount_subtotal,
        tax: with_items.bill.amount_tax,
        total: with_items.bill.amount_total,
    };
    if let Err(e) = BillingService::verify_totals(&totals) {
        error!(bill_id = %with_items.bill.id, error = %e, "stored bill totals drifted");
        return Err(e.into());
    }

    let auth = BillAuthorization {
        is_authorized: with_items.bill.is_authorized,
        authorized_by: with_items.bill.authorized_by.map(UserId::from_uuid),
        authorized_at: with_items.bill.authorized_at.map(Into::into),
    };
    if let Err(e) = BillingService::verify_authorization(&auth) {
        error!(bill_id = %with_items.bill.id, error = %e, "stored authorization stamp drifted");
        return Err(e.into());
    }

    let total_paid = CreditRepository::new(state.db().clone())
        .bill_total_paid(ctx.tenant_id.into_inner(), with_items.bill.id)
        .await
        .map_err(db_err)?;

    let remaining = match ReconService::remaining(with_items.bill.amount_total, total_paid) {
        Ok(remaining) => remaining,
        Err(e) => {
            error!(bill_id = %with_items.bill.id, error = %e, "reconciliation invariant violated");
            return Err(e.into());
        }
    };
    let payment_status = ReconService::payment_status(with_items.bill.amount_total, total_paid);

    Ok(BillDetail {
        bill: with_items,
        total_paid,
        remaining,
        payment_status,
    })
}

/// Lists bills; the organiser role only ever sees authorized rows.
///
/// The payment-status filter is applied after the query: payment status
/// is derived from the credit ledger, never stored on the bill.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_bills` capability.
pub async fn list_bills(
    state: &Ledger,
    ctx: &RequestContext,
    mut filter: BillFilter,
    payment_status: Option<PaymentStatus>,
) -> AppResult<Vec<bills::Model>> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_bills")?;

    if AuthorizationGate::bills_filtered(ctx) {
        filter.only_authorized = true;
    }

    let tenant_id = ctx.tenant_id.into_inner();
    let rows = BillRepository::new(state.db().clone())
        .list(tenant_id, &filter)
        .await
        .map_err(db_err)?;

    let Some(wanted) = payment_status else {
        return Ok(rows);
    };

    let credit_repo = CreditRepository::new(state.db().clone());
    let mut matching = Vec::new();
    for bill in rows {
        let total_paid = credit_repo
            .bill_total_paid(tenant_id, bill.id)
            .await
            .map_err(db_err)?;
        if ReconService::payment_status(bill.amount_total, total_paid) == wanted {
            matching.push(bill);
        }
    }
    Ok(matching)
}

/// Confirms a draft bill.
///
/// # Errors
///
/// Returns `Validation` unless the bill is in draft.
pub async fn confirm_bill(
    state: &Ledger,
    ctx: &RequestContext,
    bill_id: Uuid,
) -> AppResult<bills::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "confirm_bill")?;

    Ok(BillRepository::new(state.db().clone())
        .update_status(
            ctx,
            bill_id,
            BillStatus::Confirmed,
            AuditAction::ConfirmBill,
            BillingService::validate_can_confirm,
        )
        .await?)
}

/// Cancels a bill. Cancelled bills accept no items, splits, or
/// payments.
///
/// # Errors
///
/// Returns `Validation` if the bill is already cancelled.
pub async fn cancel_bill(
    state: &Ledger,
    ctx: &RequestContext,
    bill_id: Uuid,
) -> AppResult<bills::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "cancel_bill")?;

    Ok(BillRepository::new(state.db().clone())
        .update_status(
            ctx,
            bill_id,
            BillStatus::Cancelled,
            AuditAction::CancelBill,
            BillingService::validate_can_cancel,
        )
        .await?)
}

/// Authorizes a bill so the organiser role can see it.
///
/// # Errors
///
/// Returns `Conflict` if the bill is already authorized.
pub async fn authorize_bill(
    state: &Ledger,
    ctx: &RequestContext,
    bill_id: Uuid,
) -> AppResult<bills::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "authorize_bill")?;

    Ok(BillRepository::new(state.db().clone())
        .set_authorization(ctx, bill_id, true)
        .await?)
}

/// Revokes a bill's organiser visibility.
///
/// # Errors
///
/// Returns `Conflict` if the bill is not authorized.
pub async fn unauthorize_bill(
    state: &Ledger,
    ctx: &RequestContext,
    bill_id: Uuid,
) -> AppResult<bills::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "authorize_bill")?;

    Ok(BillRepository::new(state.db().clone())
        .set_authorization(ctx, bill_id, false)
        .await?)
}

/// Splits a bill into N proxy bills, atomically.
///
/// Either every split lands or none does: resolution rejects the whole
/// batch on the first malformed spec, and persistence runs in a single
/// transaction.
///
/// # Errors
///
/// Returns `NotFound` for an unknown parent or split vendor,
/// `Validation` on malformed specs, or `DuplicateKey` on a proxy number
/// collision.
pub async fn split_bill(
    state: &Ledger,
    ctx: &RequestContext,
    bill_id: Uuid,
    specs: Vec<ProxySplitSpec>,
) -> AppResult<Vec<proxy_bills::Model>> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "create_bill")?;

    let tenant_id = ctx.tenant_id.into_inner();
    let repo = BillRepository::new(state.db().clone());
    let parent = repo
        .find_by_id(tenant_id, bill_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("bill {bill_id}")))?;

    // Resolve the split vendors up front so the pure resolver can run
    // its all-or-nothing validation against a known set.
    let vendor_repo = khata_db::repositories::VendorRepository::new(state.db().clone());
    let mut known = std::collections::HashSet::new();
    for spec in &specs {
        let id = spec.vendor_id.into_inner();
        if !known.contains(&id) && vendor_repo.exists(tenant_id, id).await.map_err(db_err)? {
            known.insert(id);
        }
    }

    let resolved = ProxyService::resolve_splits(parent.status.into(), &specs, |vendor_id| {
        known.contains(&vendor_id.into_inner())
    })?;

    Ok(ProxyBillRepository::new(state.db().clone())
        .create_split(ctx, bill_id, &resolved)
        .await?)
}
