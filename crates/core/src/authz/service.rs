//! The authorization gate.

use khata_shared::RequestContext;

use super::error::AuthzError;
use crate::permission::PermissionEngine;

/// Gate wrapped around every core operation.
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Capability check: fails closed when the caller's role does not
    /// hold the permission required for the operation.
    ///
    /// # Errors
    ///
    /// Returns `AuthzError::Forbidden` when the check fails.
    pub fn require(
        ctx: &RequestContext,
        engine: &PermissionEngine,
        permission: &'static str,
    ) -> Result<(), AuthzError> {
        if engine.is_granted(ctx.role, permission) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden {
                role: ctx.role,
                permission,
            })
        }
    }

    /// Record-level visibility for a single bill.
    ///
    /// For the restricted role, an unauthorized bill must behave as if
    /// it did not exist: the error is not-found, never forbidden.
    ///
    /// # Errors
    ///
    /// Returns `AuthzError::HiddenBill` when the bill is hidden from the
    /// caller.
    pub fn ensure_bill_visible(
        ctx: &RequestContext,
        is_authorized: bool,
    ) -> Result<(), AuthzError> {
        if ctx.role.is_restricted_viewer() && !is_authorized {
            return Err(AuthzError::HiddenBill);
        }
        Ok(())
    }

    /// Returns true if bill list queries for this caller must be
    /// filtered to authorized rows.
    #[must_use]
    pub fn bills_filtered(ctx: &RequestContext) -> bool {
        ctx.role.is_restricted_viewer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khata_shared::types::{TenantId, UserId};
    use khata_shared::Role;

    fn ctx(role: Role) -> RequestContext {
        RequestContext::new(TenantId::new(), UserId::new(), role)
    }

    #[test]
    fn test_require_fails_closed() {
        let engine = PermissionEngine::new();
        let result = AuthorizationGate::require(&ctx(Role::Salesman), &engine, "create_bill");
        assert!(matches!(result, Err(AuthzError::Forbidden { .. })));
    }

    #[test]
    fn test_require_passes_with_grant() {
        let engine = PermissionEngine::from_rows(vec![(
            Role::Salesman,
            "create_bill".to_string(),
            true,
        )]);
        assert!(AuthorizationGate::require(&ctx(Role::Salesman), &engine, "create_bill").is_ok());
    }

    #[test]
    fn test_require_always_passes_for_superrole() {
        let engine = PermissionEngine::new();
        assert!(AuthorizationGate::require(&ctx(Role::Admin), &engine, "create_bill").is_ok());
    }

    #[test]
    fn test_organiser_cannot_see_unauthorized_bill() {
        let result = AuthorizationGate::ensure_bill_visible(&ctx(Role::Organiser), false);
        assert!(matches!(result, Err(AuthzError::HiddenBill)));
    }

    #[test]
    fn test_organiser_sees_authorized_bill() {
        assert!(AuthorizationGate::ensure_bill_visible(&ctx(Role::Organiser), true).is_ok());
    }

    #[test]
    fn test_other_roles_see_unauthorized_bills() {
        for role in [Role::Admin, Role::Salesman, Role::Delivery] {
            assert!(AuthorizationGate::ensure_bill_visible(&ctx(role), false).is_ok());
        }
    }

    #[test]
    fn test_list_filtering_only_for_organiser() {
        assert!(AuthorizationGate::bills_filtered(&ctx(Role::Organiser)));
        assert!(!AuthorizationGate::bills_filtered(&ctx(Role::Admin)));
        assert!(!AuthorizationGate::bills_filtered(&ctx(Role::Salesman)));
        assert!(!AuthorizationGate::bills_filtered(&ctx(Role::Delivery)));
    }
}
