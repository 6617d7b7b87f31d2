//! Audit record types.

use std::fmt;
use uuid::Uuid;

use khata_shared::RequestContext;
use khata_shared::types::{TenantId, UserId};

/// Every state-changing action the ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Vendor created.
    CreateVendor,
    /// Vendor updated.
    UpdateVendor,
    /// Vendor deleted.
    DeleteVendor,
    /// Vendors bulk-imported.
    ImportVendors,
    /// Bill created.
    CreateBill,
    /// Bill confirmed.
    ConfirmBill,
    /// Bill cancelled.
    CancelBill,
    /// Bill authorized for the restricted role.
    AuthorizeBill,
    /// Bill authorization revoked.
    UnauthorizeBill,
    /// Bill split into proxy bills.
    SplitBill,
    /// Proxy bill created.
    CreateProxyBill,
    /// Proxy bill confirmed.
    ConfirmProxyBill,
    /// Proxy bill cancelled.
    CancelProxyBill,
    /// Credit entry created.
    CreateCredit,
    /// Credit entry edited.
    UpdateCredit,
    /// Role grants changed.
    UpdatePermissions,
}

impl AuditAction {
    /// Returns the string recorded in the audit log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateVendor => "CREATE_VENDOR",
            Self::UpdateVendor => "UPDATE_VENDOR",
            Self::DeleteVendor => "DELETE_VENDOR",
            Self::ImportVendors => "IMPORT_VENDORS",
            Self::CreateBill => "CREATE_BILL",
            Self::ConfirmBill => "CONFIRM_BILL",
            Self::CancelBill => "CANCEL_BILL",
            Self::AuthorizeBill => "AUTHORIZE_BILL",
            Self::UnauthorizeBill => "UNAUTHORIZE_BILL",
            Self::SplitBill => "SPLIT_BILL",
            Self::CreateProxyBill => "CREATE_PROXY_BILL",
            Self::ConfirmProxyBill => "CONFIRM_PROXY_BILL",
            Self::CancelProxyBill => "CANCEL_PROXY_BILL",
            Self::CreateCredit => "CREATE_CREDIT",
            Self::UpdateCredit => "UPDATE_CREDIT",
            Self::UpdatePermissions => "UPDATE_PERMISSIONS",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of entity an audit record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEntityType {
    /// A vendor row.
    Vendor,
    /// A bill row.
    Bill,
    /// A proxy bill row.
    ProxyBill,
    /// A credit entry row.
    CreditEntry,
    /// The permission grant table as a whole.
    Permissions,
}

impl AuditEntityType {
    /// Returns the string recorded in the audit log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vendor => "VENDOR",
            Self::Bill => "BILL",
            Self::ProxyBill => "PROXY_BILL",
            Self::CreditEntry => "CREDIT_ENTRY",
            Self::Permissions => "PERMISSIONS",
        }
    }
}

impl fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully described audit record, ready to append.
#[derive(Debug, Clone, Copy)]
pub struct NewAuditRecord {
    /// Tenant the action happened in.
    pub tenant_id: TenantId,
    /// Who acted.
    pub user_id: UserId,
    /// What they did.
    pub action: AuditAction,
    /// What kind of entity was touched.
    pub entity_type: AuditEntityType,
    /// The touched entity's id.
    pub entity_id: Uuid,
}

impl NewAuditRecord {
    /// Builds a record from the acting request context.
    #[must_use]
    pub const fn from_ctx(
        ctx: &RequestContext,
        action: AuditAction,
        entity_type: AuditEntityType,
        entity_id: Uuid,
    ) -> Self {
        Self {
            tenant_id: ctx.tenant_id,
            user_id: ctx.user_id,
            action,
            entity_type,
            entity_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khata_shared::Role;

    #[test]
    fn test_action_strings() {
        assert_eq!(AuditAction::CreateBill.as_str(), "CREATE_BILL");
        assert_eq!(AuditAction::UnauthorizeBill.as_str(), "UNAUTHORIZE_BILL");
        assert_eq!(AuditAction::UpdatePermissions.as_str(), "UPDATE_PERMISSIONS");
    }

    #[test]
    fn test_entity_type_strings() {
        assert_eq!(AuditEntityType::ProxyBill.as_str(), "PROXY_BILL");
        assert_eq!(AuditEntityType::CreditEntry.as_str(), "CREDIT_ENTRY");
    }

    #[test]
    fn test_record_from_ctx() {
        let ctx = RequestContext::new(TenantId::new(), UserId::new(), Role::Salesman);
        let entity = Uuid::now_v7();
        let record =
            NewAuditRecord::from_ctx(&ctx, AuditAction::CreateBill, AuditEntityType::Bill, entity);

        assert_eq!(record.tenant_id, ctx.tenant_id);
        assert_eq!(record.user_id, ctx.user_id);
        assert_eq!(record.entity_id, entity);
    }
}
