//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation error (malformed or constraint-violating input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Tenant-scoped uniqueness collision (bill number, proxy number,
    /// vendor customer code or tax id).
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Capability check failed.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// A ledger invariant would be (or was found) broken. Always a bug
    /// signal when observed rather than rejected up front.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Deletion blocked by existing dependent records.
    #[error("Referential conflict: {0}")]
    ReferentialConflict(String),

    /// Conflict (e.g., concurrent modification).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code a service surface should map this to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::DuplicateKey(_) | Self::Conflict(_) | Self::ReferentialConflict(_) => 409,
            Self::InvariantViolation(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateKey(_) => "DUPLICATE_KEY",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::ReferentialConflict(_) => "REFERENTIAL_CONFLICT",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if this error signals a reconciliation bug rather than
    /// an ordinary business failure.
    #[must_use]
    pub const fn is_bug_signal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::DuplicateKey(String::new()).status_code(), 409);
        assert_eq!(AppError::ReferentialConflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::InvariantViolation(String::new()).status_code(), 422);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::DuplicateKey(String::new()).error_code(),
            "DUPLICATE_KEY"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(AppError::Forbidden(String::new()).error_code(), "FORBIDDEN");
        assert_eq!(
            AppError::InvariantViolation(String::new()).error_code(),
            "INVARIANT_VIOLATION"
        );
        assert_eq!(
            AppError::ReferentialConflict(String::new()).error_code(),
            "REFERENTIAL_CONFLICT"
        );
    }

    #[test]
    fn test_bug_signal_classification() {
        assert!(AppError::InvariantViolation(String::new()).is_bug_signal());
        assert!(AppError::Internal(String::new()).is_bug_signal());
        assert!(!AppError::Validation(String::new()).is_bug_signal());
        assert!(!AppError::DuplicateKey(String::new()).is_bug_signal());
        assert!(!AppError::Forbidden(String::new()).is_bug_signal());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::InvariantViolation("msg".into()).to_string(),
            "Invariant violation: msg"
        );
        assert_eq!(
            AppError::ReferentialConflict("msg".into()).to_string(),
            "Referential conflict: msg"
        );
    }
}
