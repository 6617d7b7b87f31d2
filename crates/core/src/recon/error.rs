//! Reconciliation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use khata_shared::AppError;

/// Errors that can occur during reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconError {
    // ========== Validation Errors ==========
    /// Credit entry amount must be positive.
    #[error("Credit entry amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// A credit entry may reference a bill or a proxy bill, never both.
    #[error("Credit entry cannot reference both a bill and a proxy bill")]
    BothContainers,

    /// Cancelled containers accept no payments.
    #[error("Cannot record a payment against a cancelled bill")]
    ContainerCancelled,

    /// The entry's vendor does not match the container's vendor.
    #[error("Credit entry vendor does not match the bill's vendor")]
    ContainerVendorMismatch,

    // ========== Invariant Errors ==========
    /// The payment would push total incoming past the container total.
    #[error("Payment of {amount} exceeds remaining balance of {remaining}")]
    PaymentExceedsRemaining {
        /// The rejected payment amount.
        amount: Decimal,
        /// The remaining balance at the consistent snapshot.
        remaining: Decimal,
    },

    /// Observed total paid above the container total. Signals a
    /// reconciliation bug, never a valid state.
    #[error("Negative remaining observed: total paid {total_paid} exceeds total {amount_total}")]
    NegativeRemaining {
        /// Sum of incoming entries observed.
        total_paid: Decimal,
        /// The container total.
        amount_total: Decimal,
    },
}

impl ReconError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::BothContainers => "BOTH_CONTAINERS",
            Self::ContainerCancelled => "CONTAINER_CANCELLED",
            Self::ContainerVendorMismatch => "CONTAINER_VENDOR_MISMATCH",
            Self::PaymentExceedsRemaining { .. } => "PAYMENT_EXCEEDS_REMAINING",
            Self::NegativeRemaining { .. } => "NEGATIVE_REMAINING",
        }
    }

    /// Returns true for errors that indicate a reconciliation bug rather
    /// than a rejected input.
    #[must_use]
    pub const fn is_bug_signal(&self) -> bool {
        matches!(self, Self::NegativeRemaining { .. })
    }
}

impl From<ReconError> for AppError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::PaymentExceedsRemaining { .. } | ReconError::NegativeRemaining { .. } => {
                Self::InvariantViolation(err.to_string())
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
        assert_eq!(
            ReconError::NonPositiveAmount(dec!(0)).error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            ReconError::PaymentExceedsRemaining {
                amount: dec!(700),
                remaining: dec!(680),
            }
            .error_code(),
            "PAYMENT_EXCEEDS_REMAINING"
        );
    }

    #[test]
    fn test_overpayment_maps_to_invariant_violation() {
        let app: AppError = ReconError::PaymentExceedsRemaining {
            amount: dec!(1),
            remaining: dec!(0),
        }
        .into();
        assert!(matches!(app, AppError::InvariantViolation(_)));
    }

    #[test]
    fn test_negative_remaining_is_bug_signal() {
        let err = ReconError::NegativeRemaining {
            total_paid: dec!(1200),
            amount_total: dec!(1180),
        };
        assert!(err.is_bug_signal());
        let app: AppError = err.into();
        assert!(app.is_bug_signal());
    }

    #[test]
    fn test_validation_mapping() {
        let app: AppError = ReconError::BothContainers.into();
        assert!(matches!(app, AppError::Validation(_)));
        let app: AppError = ReconError::ContainerCancelled.into();
        assert!(matches!(app, AppError::Validation(_)));
    }
}
