//! Bill validation and lifecycle error types.

use rust_decimal::Decimal;
use thiserror::Error;

use khata_shared::AppError;

use super::types::BillStatus;

/// Errors that can occur during bill operations.
#[derive(Debug, Error)]
pub enum BillingError {
    // ========== Validation Errors ==========
    /// Bill must have at least one item.
    #[error("Bill must have at least one item")]
    NoItems,

    /// Item description cannot be empty.
    #[error("Item {0} has an empty description")]
    EmptyItemDescription(usize),

    /// Item quantity must be positive.
    #[error("Item {index} quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// Zero-based item index.
        index: usize,
        /// The rejected quantity.
        quantity: Decimal,
    },

    /// Item unit price must be positive.
    #[error("Item {index} unit price must be positive, got {unit_price}")]
    NonPositiveUnitPrice {
        /// Zero-based item index.
        index: usize,
        /// The rejected unit price.
        unit_price: Decimal,
    },

    /// Bill number cannot be empty.
    #[error("Bill number cannot be empty")]
    EmptyBillNumber,

    /// Tax rate cannot be negative.
    #[error("Tax rate cannot be negative, got {0}")]
    NegativeTaxRate(Decimal),

    // ========== Invariant Errors ==========
    /// Item amounts do not sum to the stated subtotal.
    #[error("Item amounts sum to {actual}, expected subtotal {expected}")]
    ItemSumMismatch {
        /// The stated subtotal.
        expected: Decimal,
        /// The computed item sum.
        actual: Decimal,
    },

    /// The stored monetary triple does not satisfy total = subtotal + tax.
    #[error("Bill total {total} != subtotal {subtotal} + tax {tax}")]
    TotalMismatch {
        /// Stored subtotal.
        subtotal: Decimal,
        /// Stored tax.
        tax: Decimal,
        /// Stored total.
        total: Decimal,
    },

    /// The authorization flag disagrees with its stamp fields.
    #[error("Authorization flag is inconsistent with its by/at stamp")]
    InconsistentAuthorization,

    // ========== Lifecycle Errors ==========
    /// Only draft bills can be confirmed.
    #[error("Cannot confirm a bill in {0} status")]
    NotDraft(BillStatus),

    /// The bill is already cancelled.
    #[error("Bill is already cancelled")]
    AlreadyCancelled,

    /// Items are immutable once the bill leaves draft.
    #[error("Cannot modify items of a bill in {0} status")]
    ItemsImmutable(BillStatus),

    // ========== Authorization Flag Errors ==========
    /// The bill is already authorized.
    #[error("Bill is already authorized")]
    AlreadyAuthorized,

    /// The bill is not authorized.
    #[error("Bill is not authorized")]
    NotAuthorized,
}

impl BillingError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoItems => "NO_ITEMS",
            Self::EmptyItemDescription(_) => "EMPTY_ITEM_DESCRIPTION",
            Self::NonPositiveQuantity { .. } => "NON_POSITIVE_QUANTITY",
            Self::NonPositiveUnitPrice { .. } => "NON_POSITIVE_UNIT_PRICE",
            Self::EmptyBillNumber => "EMPTY_BILL_NUMBER",
            Self::NegativeTaxRate(_) => "NEGATIVE_TAX_RATE",
            Self::ItemSumMismatch { .. } => "ITEM_SUM_MISMATCH",
            Self::TotalMismatch { .. } => "TOTAL_MISMATCH",
            Self::InconsistentAuthorization => "INCONSISTENT_AUTHORIZATION",
            Self::NotDraft(_) => "NOT_DRAFT",
            Self::AlreadyCancelled => "ALREADY_CANCELLED",
            Self::ItemsImmutable(_) => "ITEMS_IMMUTABLE",
            Self::AlreadyAuthorized => "ALREADY_AUTHORIZED",
            Self::NotAuthorized => "NOT_AUTHORIZED",
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::ItemSumMismatch { .. }
            | BillingError::TotalMismatch { .. }
            | BillingError::InconsistentAuthorization => Self::InvariantViolation(err.to_string()),
            BillingError::AlreadyAuthorized | BillingError::NotAuthorized => {
                Self::Conflict(err.to_string())
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(BillingError::NoItems.error_code(), "NO_ITEMS");
        assert_eq!(
            BillingError::ItemSumMismatch {
                expected: dec!(100),
                actual: dec!(90),
            }
            .error_code(),
            "ITEM_SUM_MISMATCH"
        );
        assert_eq!(
            BillingError::NotDraft(BillStatus::Confirmed).error_code(),
            "NOT_DRAFT"
        );
    }

    #[test]
    fn test_invariant_errors_map_to_invariant_violation() {
        let app: AppError = BillingError::TotalMismatch {
            subtotal: dec!(100),
            tax: dec!(18),
            total: dec!(119),
        }
        .into();
        assert!(matches!(app, AppError::InvariantViolation(_)));
        assert!(app.is_bug_signal());
    }

    #[test]
    fn test_validation_errors_map_to_validation() {
        let app: AppError = BillingError::NoItems.into();
        assert!(matches!(app, AppError::Validation(_)));

        let app: AppError = BillingError::NotDraft(BillStatus::Cancelled).into();
        assert!(matches!(app, AppError::Validation(_)));
    }

    #[test]
    fn test_authorization_toggle_errors_map_to_conflict() {
        let app: AppError = BillingError::AlreadyAuthorized.into();
        assert!(matches!(app, AppError::Conflict(_)));
    }
}
