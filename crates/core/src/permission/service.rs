//! The permission engine: sparse grant map with a superrole bypass.

use std::collections::HashMap;

use khata_shared::Role;

use super::catalog;
use super::error::PermissionError;

/// Evaluates `(role, permission code)` grants.
///
/// Built from the persisted sparse mapping. Absence of an entry means
/// *not granted* (default-deny). The superrole short-circuits to granted
/// before the map is consulted, so a missing or false row can never lock
/// out the administrative role.
#[derive(Debug, Clone, Default)]
pub struct PermissionEngine {
    grants: HashMap<(Role, String), bool>,
}

impl PermissionEngine {
    /// Creates an engine with an empty grant map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine from persisted `(role, code, granted)` rows.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Role, String, bool)>,
    {
        let grants = rows
            .into_iter()
            .map(|(role, code, granted)| ((role, code), granted))
            .collect();
        Self { grants }
    }

    /// Returns whether the role holds the permission.
    #[must_use]
    pub fn is_granted(&self, role: Role, code: &str) -> bool {
        if role.is_superrole() {
            return true;
        }
        self.grants
            .get(&(role, code.to_string()))
            .copied()
            .unwrap_or(false)
    }

    /// Stages a grant change, validating the code and protecting the
    /// superrole.
    ///
    /// # Errors
    ///
    /// Returns `PermissionError` for an unknown code or an attempt to
    /// modify the administrative role's grants.
    pub fn set_grant(
        &mut self,
        role: Role,
        code: &str,
        granted: bool,
    ) -> Result<(), PermissionError> {
        if role.is_superrole() {
            return Err(PermissionError::SuperroleImmutable(role));
        }
        if !catalog::is_known(code) {
            return Err(PermissionError::UnknownPermission(code.to_string()));
        }
        self.grants.insert((role, code.to_string()), granted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deny_on_empty_map() {
        let engine = PermissionEngine::new();
        assert!(!engine.is_granted(Role::Salesman, "view_bills"));
        assert!(!engine.is_granted(Role::Organiser, "create_bill"));
    }

    #[test]
    fn test_superrole_granted_everything_even_with_empty_map() {
        let engine = PermissionEngine::new();
        for def in catalog::CATALOG {
            assert!(engine.is_granted(Role::Admin, def.code), "{}", def.code);
        }
    }

    #[test]
    fn test_superrole_ignores_explicit_false_rows() {
        let engine = PermissionEngine::from_rows(vec![(
            Role::Admin,
            "view_bills".to_string(),
            false,
        )]);
        assert!(engine.is_granted(Role::Admin, "view_bills"));
    }

    #[test]
    fn test_granted_row() {
        let engine = PermissionEngine::from_rows(vec![(
            Role::Salesman,
            "view_bills".to_string(),
            true,
        )]);
        assert!(engine.is_granted(Role::Salesman, "view_bills"));
        assert!(!engine.is_granted(Role::Delivery, "view_bills"));
    }

    #[test]
    fn test_explicit_false_row_denies() {
        let engine = PermissionEngine::from_rows(vec![(
            Role::Salesman,
            "view_bills".to_string(),
            false,
        )]);
        assert!(!engine.is_granted(Role::Salesman, "view_bills"));
    }

    #[test]
    fn test_set_grant_round_trip() {
        let mut engine = PermissionEngine::new();
        engine
            .set_grant(Role::Organiser, "view_bills", true)
            .unwrap();
        assert!(engine.is_granted(Role::Organiser, "view_bills"));

        engine
            .set_grant(Role::Organiser, "view_bills", false)
            .unwrap();
        assert!(!engine.is_granted(Role::Organiser, "view_bills"));
    }

    #[test]
    fn test_set_grant_rejects_superrole() {
        let mut engine = PermissionEngine::new();
        assert!(matches!(
            engine.set_grant(Role::Admin, "view_bills", false),
            Err(PermissionError::SuperroleImmutable(Role::Admin))
        ));
    }

    #[test]
    fn test_set_grant_rejects_unknown_code() {
        let mut engine = PermissionEngine::new();
        assert!(matches!(
            engine.set_grant(Role::Salesman, "fly_helicopter", true),
            Err(PermissionError::UnknownPermission(_))
        ));
    }
}
