//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `VendorId` where a
//! `BillId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant.");
typed_id!(UserId, "Unique identifier for a user.");
typed_id!(VendorId, "Unique identifier for a vendor.");
typed_id!(BillId, "Unique identifier for a bill.");
typed_id!(BillItemId, "Unique identifier for a bill item.");
typed_id!(ProxyBillId, "Unique identifier for a proxy bill.");
typed_id!(ProxyBillItemId, "Unique identifier for a proxy bill item.");
typed_id!(CreditEntryId, "Unique identifier for a credit entry.");
typed_id!(PermissionId, "Unique identifier for a permission catalog entry.");
typed_id!(AuditLogId, "Unique identifier for an audit log entry.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ids_are_distinct_types() {
        let uuid = Uuid::now_v7();
        let vendor = VendorId::from_uuid(uuid);
        let bill = BillId::from_uuid(uuid);
        assert_eq!(vendor.into_inner(), bill.into_inner());
    }

    #[test]
    fn test_id_from_str_round_trip() {
        let id = BillId::new();
        let parsed = BillId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_from_str_rejects_garbage() {
        assert!(TenantId::from_str("not-a-uuid").is_err());
    }
}
