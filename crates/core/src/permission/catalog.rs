//! The fixed permission catalog.

use khata_shared::Role;

/// A permission catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDef {
    /// Stable permission code.
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// What the permission allows.
    pub description: &'static str,
    /// Grouping category.
    pub category: &'static str,
}

/// The full permission catalog, grouped by category.
pub const CATALOG: &[PermissionDef] = &[
    // Vendors
    PermissionDef {
        code: "view_vendors",
        name: "View Vendors",
        description: "View the vendor list and vendor details",
        category: "Vendors",
    },
    PermissionDef {
        code: "create_vendor",
        name: "Create Vendor",
        description: "Create new vendors",
        category: "Vendors",
    },
    PermissionDef {
        code: "edit_vendor",
        name: "Edit Vendor",
        description: "Edit existing vendors",
        category: "Vendors",
    },
    PermissionDef {
        code: "delete_vendor",
        name: "Delete Vendor",
        description: "Delete vendors with no dependent records",
        category: "Vendors",
    },
    PermissionDef {
        code: "import_vendors",
        name: "Import Vendors",
        description: "Bulk-import vendors from mapped spreadsheet rows",
        category: "Vendors",
    },
    // Bills
    PermissionDef {
        code: "view_bills",
        name: "View Bills",
        description: "View bills and proxy bills",
        category: "Bills",
    },
    PermissionDef {
        code: "create_bill",
        name: "Create Bill",
        description: "Create bills and proxy bill splits",
        category: "Bills",
    },
    PermissionDef {
        code: "confirm_bill",
        name: "Confirm Bill",
        description: "Confirm draft bills and proxy bills",
        category: "Bills",
    },
    PermissionDef {
        code: "cancel_bill",
        name: "Cancel Bill",
        description: "Cancel bills and proxy bills",
        category: "Bills",
    },
    PermissionDef {
        code: "authorize_bill",
        name: "Authorize Bill",
        description: "Toggle a bill's visibility to the organiser role",
        category: "Bills",
    },
    // Credits
    PermissionDef {
        code: "view_credits",
        name: "View Credits",
        description: "View credit entries",
        category: "Credits",
    },
    PermissionDef {
        code: "create_credit",
        name: "Create Credit",
        description: "Record payments and other credit entries",
        category: "Credits",
    },
    PermissionDef {
        code: "edit_credit",
        name: "Edit Credit",
        description: "Edit existing credit entries",
        category: "Credits",
    },
    // Reports
    PermissionDef {
        code: "view_reports",
        name: "View Reports",
        description: "View outstanding, collection, and dashboard reports",
        category: "Reports",
    },
    // Administration
    PermissionDef {
        code: "manage_permissions",
        name: "Manage Permissions",
        description: "Change role permission grants",
        category: "Administration",
    },
];

/// Looks up a catalog entry by code.
#[must_use]
pub fn find(code: &str) -> Option<&'static PermissionDef> {
    CATALOG.iter().find(|p| p.code == code)
}

/// Returns true if the code exists in the catalog.
#[must_use]
pub fn is_known(code: &str) -> bool {
    find(code).is_some()
}

/// Default grants seeded for a role when the sparse map is empty.
///
/// The administrative role has no row here: it is granted everything
/// implicitly and never consulted in the map.
#[must_use]
pub fn default_grants(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &[],
        Role::Salesman => &[
            "view_vendors",
            "create_vendor",
            "edit_vendor",
            "view_bills",
            "create_bill",
            "view_credits",
            "create_credit",
            "view_reports",
        ],
        Role::Delivery => &["view_vendors", "view_bills"],
        Role::Organiser => &["view_bills"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let mut seen = HashSet::new();
        for def in CATALOG {
            assert!(seen.insert(def.code), "duplicate code {}", def.code);
        }
    }

    #[test]
    fn test_find_known_codes() {
        assert!(find("view_bills").is_some());
        assert!(find("manage_permissions").is_some());
        assert!(find("launch_rockets").is_none());
    }

    #[test]
    fn test_expected_categories_present() {
        let categories: HashSet<_> = CATALOG.iter().map(|p| p.category).collect();
        for category in ["Vendors", "Bills", "Credits", "Reports", "Administration"] {
            assert!(categories.contains(category), "missing {category}");
        }
    }

    #[test]
    fn test_default_grants_reference_known_codes() {
        for role in Role::ALL {
            for code in default_grants(role) {
                assert!(is_known(code), "unknown default grant {code} for {role}");
            }
        }
    }

    #[test]
    fn test_admin_has_no_default_rows() {
        assert!(default_grants(Role::Admin).is_empty());
    }
}
