//! Credit entry operations.
//!
//! `accept_payment` is the only path that creates a credit entry linked
//! to a bill or proxy bill; the repository runs the reconciliation
//! check against a locked container snapshot so concurrent payments
//! serialize instead of jointly overshooting the total.

use rust_decimal::Decimal;
use uuid::Uuid;

use khata_core::authz::AuthorizationGate;
use khata_core::recon::{CreditDirection, CreditEntryInput, ReconService};
use khata_db::entities::credit_entries;
use khata_db::repositories::credit::CreditFilter;
use khata_db::repositories::CreditRepository;
use khata_shared::{AppError, AppResult, RequestContext};

use crate::{db_err, Ledger};

/// Records a payment (or any credit entry) against a bill, proxy bill,
/// or bare vendor.
///
/// # Errors
///
/// Returns `Forbidden` without `create_credit`, `Validation` on a
/// malformed entry, `NotFound` for unknown references, or
/// `InvariantViolation` when an incoming payment would exceed the
/// container's remaining balance (the store is left unchanged).
pub async fn accept_payment(
    state: &Ledger,
    ctx: &RequestContext,
    input: CreditEntryInput,
) -> AppResult<credit_entries::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "create_credit")?;

    ReconService::validate_entry(&input)?;

    Ok(CreditRepository::new(state.db().clone())
        .create_entry(ctx, &input)
        .await?)
}

/// Edits a credit entry through the explicit supersede path.
///
/// Revalidates everything creation would, including the incoming cap
/// recomputed with this entry excluded, and preserves tenant/vendor
/// consistency with the container.
///
/// # Errors
///
/// Returns `NotFound` for an unknown entry plus the same failures as
/// `accept_payment`.
pub async fn edit_credit_entry(
    state: &Ledger,
    ctx: &RequestContext,
    entry_id: Uuid,
    input: CreditEntryInput,
) -> AppResult<credit_entries::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "edit_credit")?;

    ReconService::validate_entry(&input)?;

    Ok(CreditRepository::new(state.db().clone())
        .update_entry(ctx, entry_id, &input)
        .await?)
}

/// Fetches one credit entry.
///
/// # Errors
///
/// Returns `NotFound` for an unknown entry.
pub async fn get_credit_entry(
    state: &Ledger,
    ctx: &RequestContext,
    entry_id: Uuid,
) -> AppResult<credit_entries::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_credits")?;

    CreditRepository::new(state.db().clone())
        .find_by_id(ctx.tenant_id.into_inner(), entry_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("credit entry {entry_id}")))
}

/// Lists the tenant's credit entries.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_credits` capability.
pub async fn list_credit_entries(
    state: &Ledger,
    ctx: &RequestContext,
    filter: CreditFilter,
) -> AppResult<Vec<credit_entries::Model>> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_credits")?;

    CreditRepository::new(state.db().clone())
        .list(ctx.tenant_id.into_inner(), &filter)
        .await
        .map_err(db_err)
}

/// Convenience used by bill detail surfaces: payments recorded against
/// a bill together with the derived totals.
#[derive(Debug, Clone)]
pub struct BillPayments {
    /// The entries, newest first.
    pub entries: Vec<credit_entries::Model>,
    /// Sum of the incoming entries.
    pub total_paid: Decimal,
}

/// Lists payments recorded against a bill with their incoming sum.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_credits` capability.
pub async fn bill_payments(
    state: &Ledger,
    ctx: &RequestContext,
    bill_id: Uuid,
) -> AppResult<BillPayments> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_credits")?;

    let tenant_id = ctx.tenant_id.into_inner();
    let repo = CreditRepository::new(state.db().clone());
    let entries = repo.list_for_bill(tenant_id, bill_id).await.map_err(db_err)?;

    let incoming: Vec<Decimal> = entries
        .iter()
        .filter(|e| {
            CreditDirection::from(e.direction.clone()) == CreditDirection::Incoming
        })
        .map(|e| e.amount)
        .collect();
    let total_paid = ReconService::total_paid(&incoming);

    Ok(BillPayments {
        entries,
        total_paid,
    })
}
