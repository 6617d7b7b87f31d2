//! Vendor operations.

use uuid::Uuid;

use khata_core::audit::{AuditAction, AuditEntityType, NewAuditRecord};
use khata_core::authz::AuthorizationGate;
use khata_core::vendor::{CreateVendorInput, ImportSummary, VendorService};
use khata_db::entities::vendors;
use khata_db::repositories::{AuditLogRepository, VendorRepository};
use khata_db::repositories::vendor::VendorFilter;
use khata_shared::{AppError, AppResult, RequestContext};

use crate::{db_err, Ledger};

/// Creates a vendor.
///
/// # Errors
///
/// Returns `Forbidden` without the `create_vendor` capability,
/// `Validation` on bad fields, or `DuplicateKey` on a customer code /
/// GST collision within the tenant.
pub async fn create_vendor(
    state: &Ledger,
    ctx: &RequestContext,
    input: CreateVendorInput,
) -> AppResult<vendors::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "create_vendor")?;

    let repo = VendorRepository::new(state.db().clone());
    let tenant_id = ctx.tenant_id.into_inner();

    validate_against_store(&repo, tenant_id, &input, None).await?;

    Ok(repo.create(ctx, &input).await?)
}

/// Updates a vendor's fields.
///
/// # Errors
///
/// Returns `NotFound` for an unknown vendor, plus the same failures as
/// `create_vendor`.
pub async fn update_vendor(
    state: &Ledger,
    ctx: &RequestContext,
    vendor_id: Uuid,
    input: CreateVendorInput,
) -> AppResult<vendors::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "edit_vendor")?;

    let repo = VendorRepository::new(state.db().clone());
    let tenant_id = ctx.tenant_id.into_inner();

    validate_against_store(&repo, tenant_id, &input, Some(vendor_id)).await?;

    Ok(repo.update(ctx, vendor_id, &input).await?)
}

/// Runs the core validation with tenant-scoped duplicate lookups.
async fn validate_against_store(
    repo: &VendorRepository,
    tenant_id: Uuid,
    input: &CreateVendorInput,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let code_taken = match input.customer_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => repo
            .customer_code_taken(tenant_id, code, exclude)
            .await
            .map_err(db_err)?,
        _ => false,
    };
    let gst_taken = match input.gst_number.as_deref().map(str::trim) {
        Some(gst) if !gst.is_empty() => repo
            .gst_number_taken(tenant_id, gst, exclude)
            .await
            .map_err(db_err)?,
        _ => false,
    };

    VendorService::validate(input, |_| code_taken, |_| gst_taken)?;
    Ok(())
}

/// Fetches one vendor.
///
/// # Errors
///
/// Returns `NotFound` for an unknown vendor.
pub async fn get_vendor(
    state: &Ledger,
    ctx: &RequestContext,
    vendor_id: Uuid,
) -> AppResult<vendors::Model> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_vendors")?;

    VendorRepository::new(state.db().clone())
        .find_by_id(ctx.tenant_id.into_inner(), vendor_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("vendor {vendor_id}")))
}

/// Lists the tenant's vendors.
///
/// # Errors
///
/// Returns `Forbidden` without the `view_vendors` capability.
pub async fn list_vendors(
    state: &Ledger,
    ctx: &RequestContext,
    filter: VendorFilter,
) -> AppResult<Vec<vendors::Model>> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "view_vendors")?;

    VendorRepository::new(state.db().clone())
        .list(ctx.tenant_id.into_inner(), &filter)
        .await
        .map_err(db_err)
}

/// Deletes a vendor with the referential guard.
///
/// # Errors
///
/// Returns `ReferentialConflict` when bills, proxy bills, or credit
/// entries still reference the vendor.
pub async fn delete_vendor(
    state: &Ledger,
    ctx: &RequestContext,
    vendor_id: Uuid,
) -> AppResult<()> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "delete_vendor")?;

    let repo = VendorRepository::new(state.db().clone());

    // Surface the conflict early with counts; the repository re-checks
    // inside the delete transaction.
    let usage = repo
        .usage(ctx.tenant_id.into_inner(), vendor_id)
        .await
        .map_err(db_err)?;
    VendorService::validate_delete(&usage)?;

    Ok(repo.delete(ctx, vendor_id).await?)
}

/// Bulk-imports pre-mapped vendor rows.
///
/// Offending rows (validation failures, duplicate codes) are skipped
/// with a reason; the batch continues. This is the only operation with
/// intentional partial success; the returned summary carries explicit
/// created/skipped counts and per-row reasons.
///
/// # Errors
///
/// Returns `Forbidden` without the `import_vendors` capability, or a
/// database error that aborts the batch.
pub async fn import_vendors(
    state: &Ledger,
    ctx: &RequestContext,
    rows: Vec<CreateVendorInput>,
) -> AppResult<ImportSummary> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "import_vendors")?;

    let repo = VendorRepository::new(state.db().clone());
    let tenant_id = ctx.tenant_id.into_inner();

    // Seed the duplicate sets from the store once, then track
    // within-batch duplicates as rows land.
    let existing = repo.list(tenant_id, &VendorFilter::default()).await.map_err(db_err)?;
    let mut codes: std::collections::HashSet<String> = existing
        .iter()
        .filter_map(|v| v.customer_code.clone())
        .collect();
    let mut gsts: std::collections::HashSet<String> = existing
        .iter()
        .filter_map(|v| v.gst_number.clone())
        .collect();

    let mut summary = ImportSummary::default();

    for (index, input) in rows.iter().enumerate() {
        let row_number = index + 1;

        let result = VendorService::validate(
            input,
            |code| codes.contains(code),
            |gst| gsts.contains(gst),
        );
        if let Err(reason) = result {
            summary.record_skipped(row_number, reason.to_string());
            continue;
        }

        match repo.create(ctx, input).await {
            Ok(created) => {
                if let Some(code) = created.customer_code {
                    codes.insert(code);
                }
                if let Some(gst) = created.gst_number {
                    gsts.insert(gst);
                }
                summary.record_created();
            }
            Err(e) => summary.record_skipped(row_number, e.to_string()),
        }
    }

    let audit = NewAuditRecord::from_ctx(
        ctx,
        AuditAction::ImportVendors,
        AuditEntityType::Vendor,
        Uuid::nil(),
    );
    AuditLogRepository::append(state.db(), &audit)
        .await
        .map_err(db_err)?;

    Ok(summary)
}
