//! Authorization gate error types.

use thiserror::Error;

use khata_shared::{AppError, Role};

/// Errors raised by the authorization gate.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The role does not hold the required permission.
    #[error("Role {role} does not hold permission {permission}")]
    Forbidden {
        /// The caller's role.
        role: Role,
        /// The permission code required by the operation.
        permission: &'static str,
    },

    /// The restricted role asked for a bill it cannot see. Reported as
    /// not-found so the record's existence is not confirmed.
    #[error("Bill not found")]
    HiddenBill,
}

impl From<AuthzError> for AppError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            AuthzError::HiddenBill => Self::NotFound("bill".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_maps_to_forbidden() {
        let app: AppError = AuthzError::Forbidden {
            role: Role::Delivery,
            permission: "create_bill",
        }
        .into();
        assert!(matches!(app, AppError::Forbidden(_)));
        assert_eq!(app.status_code(), 403);
    }

    #[test]
    fn test_hidden_bill_maps_to_not_found_not_forbidden() {
        let app: AppError = AuthzError::HiddenBill.into();
        assert!(matches!(app, AppError::NotFound(_)));
        assert_eq!(app.status_code(), 404);
    }
}
