//! Permission engine error types.

use thiserror::Error;

use khata_shared::{AppError, Role};

/// Errors that can occur while evaluating or changing grants.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// The permission code is not in the catalog.
    #[error("Unknown permission code: {0}")]
    UnknownPermission(String),

    /// The administrative role's grants are not configurable.
    #[error("Grants for the {0} role cannot be modified")]
    SuperroleImmutable(Role),
}

impl PermissionError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPermission(_) => "UNKNOWN_PERMISSION",
            Self::SuperroleImmutable(_) => "SUPERROLE_IMMUTABLE",
        }
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::UnknownPermission(_) => Self::NotFound(err.to_string()),
            PermissionError::SuperroleImmutable(_) => Self::Forbidden(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mappings() {
        let app: AppError = PermissionError::UnknownPermission("x".into()).into();
        assert!(matches!(app, AppError::NotFound(_)));

        let app: AppError = PermissionError::SuperroleImmutable(Role::Admin).into();
        assert!(matches!(app, AppError::Forbidden(_)));
    }
}
