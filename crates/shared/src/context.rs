//! Request identity context and role enumeration.
//!
//! Every core operation receives a `(tenant, user, role)` triple resolved
//! by an external authentication layer. The core trusts this triple and
//! never resolves a tenant on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{TenantId, UserId};

/// Named capability classes known to the permission engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Administrative role. Granted every permission unconditionally.
    Admin,
    /// Sales staff.
    Salesman,
    /// Delivery staff.
    Delivery,
    /// Restricted viewer. Sees only bills flagged as authorized.
    Organiser,
}

impl Role {
    /// All roles, in catalog order.
    pub const ALL: [Self; 4] = [Self::Admin, Self::Salesman, Self::Delivery, Self::Organiser];

    /// Returns true for the administrative role, which bypasses the
    /// sparse grant mapping entirely.
    #[must_use]
    pub const fn is_superrole(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true for the restricted role whose bill visibility is
    /// gated on the per-record authorization flag.
    #[must_use]
    pub const fn is_restricted_viewer(self) -> bool {
        matches!(self, Self::Organiser)
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Salesman => "SALESMAN",
            Self::Delivery => "DELIVERY",
            Self::Organiser => "ORGANISER",
        }
    }

    /// Parses a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "SALESMAN" => Some(Self::Salesman),
            "DELIVERY" => Some(Self::Delivery),
            "ORGANISER" => Some(Self::Organiser),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity context threaded through every core call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// The tenant all reads and writes are scoped to.
    pub tenant_id: TenantId,
    /// The acting user.
    pub user_id: UserId,
    /// The acting user's role.
    pub role: Role,
}

impl RequestContext {
    /// Creates a new request context.
    #[must_use]
    pub const fn new(tenant_id: TenantId, user_id: UserId, role: Role) -> Self {
        Self {
            tenant_id,
            user_id,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superrole_flag() {
        assert!(Role::Admin.is_superrole());
        assert!(!Role::Salesman.is_superrole());
        assert!(!Role::Delivery.is_superrole());
        assert!(!Role::Organiser.is_superrole());
    }

    #[test]
    fn test_restricted_viewer_flag() {
        assert!(Role::Organiser.is_restricted_viewer());
        assert!(!Role::Admin.is_restricted_viewer());
        assert!(!Role::Salesman.is_restricted_viewer());
        assert!(!Role::Delivery.is_restricted_viewer());
    }

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("organiser"), Some(Role::Organiser));
        assert_eq!(Role::parse("MANAGER"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::Organiser.to_string(), "ORGANISER");
    }
}
