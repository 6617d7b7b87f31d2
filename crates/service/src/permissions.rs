//! Permission management operations.

use khata_core::authz::AuthorizationGate;
use khata_core::permission::{catalog, PermissionError};
use khata_db::entities::permissions;
use khata_db::repositories::PermissionRepository;
use khata_shared::{AppResult, RequestContext, Role};

use crate::{db_err, Ledger};

/// One catalog entry with each role's grant state.
#[derive(Debug, Clone)]
pub struct PermissionRow {
    /// The catalog entry.
    pub permission: permissions::Model,
    /// Grant state per role, in `Role::ALL` order. The administrative
    /// role always reads granted.
    pub grants: Vec<(Role, bool)>,
}

/// Lists the catalog with every role's grant state.
///
/// # Errors
///
/// Returns `Forbidden` without the `manage_permissions` capability.
pub async fn permission_matrix(
    state: &Ledger,
    ctx: &RequestContext,
) -> AppResult<Vec<PermissionRow>> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "manage_permissions")?;

    let rows = PermissionRepository::new(state.db().clone())
        .list_catalog()
        .await
        .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|permission| {
            let grants = Role::ALL
                .iter()
                .map(|role| (*role, engine.is_granted(*role, &permission.code)))
                .collect();
            PermissionRow { permission, grants }
        })
        .collect())
}

/// Checks a single grant. Exposed for external surfaces that render
/// capability-dependent UI.
///
/// # Errors
///
/// Returns an error if the grant map cannot be loaded.
pub async fn is_granted(state: &Ledger, role: Role, code: &str) -> AppResult<bool> {
    let engine = state.engine().await?;
    Ok(engine.is_granted(role, code))
}

/// Changes one grant for a non-administrative role and invalidates the
/// per-process grant cache.
///
/// # Errors
///
/// Returns `Forbidden` for the administrative role's grants (they are
/// not configurable) and `NotFound` for an unknown permission code.
pub async fn set_grant(
    state: &Ledger,
    ctx: &RequestContext,
    role: Role,
    code: &str,
    granted: bool,
) -> AppResult<()> {
    let engine = state.engine().await?;
    AuthorizationGate::require(ctx, &engine, "manage_permissions")?;

    if role.is_superrole() {
        return Err(PermissionError::SuperroleImmutable(role).into());
    }
    if !catalog::is_known(code) {
        return Err(PermissionError::UnknownPermission(code.to_string()).into());
    }

    PermissionRepository::new(state.db().clone())
        .set_grant(ctx, role, code, granted)
        .await?;

    state.invalidate_grants();
    Ok(())
}
