//! Proxy bill error types.

use thiserror::Error;

use khata_shared::types::VendorId;
use khata_shared::AppError;

use crate::billing::BillingError;

/// Errors that can occur while resolving a proxy bill split.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A split must contain at least one proxy specification.
    #[error("Split must contain at least one proxy bill")]
    NoSplits,

    /// Proxy number cannot be empty.
    #[error("Split {0} has an empty proxy number")]
    EmptyProxyNumber(usize),

    /// The same proxy number appears twice in one split.
    #[error("Proxy number {0} appears more than once in the split")]
    DuplicateNumberInSplit(String),

    /// A split references a vendor that does not exist in this tenant.
    #[error("Split {index} references unknown vendor {vendor_id}")]
    UnknownVendor {
        /// Zero-based split index.
        index: usize,
        /// The unknown vendor id.
        vendor_id: VendorId,
    },

    /// Cancelled bills cannot be split.
    #[error("Cannot split a cancelled bill")]
    ParentCancelled,

    /// An item in one of the splits failed validation.
    #[error("Split {index}: {source}")]
    InvalidItems {
        /// Zero-based split index.
        index: usize,
        /// The underlying item error.
        source: BillingError,
    },
}

impl ProxyError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoSplits => "NO_SPLITS",
            Self::EmptyProxyNumber(_) => "EMPTY_PROXY_NUMBER",
            Self::DuplicateNumberInSplit(_) => "DUPLICATE_NUMBER_IN_SPLIT",
            Self::UnknownVendor { .. } => "UNKNOWN_VENDOR",
            Self::ParentCancelled => "PARENT_CANCELLED",
            Self::InvalidItems { .. } => "INVALID_ITEMS",
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::UnknownVendor { vendor_id, .. } => {
                Self::NotFound(format!("vendor {vendor_id}"))
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_vendor_maps_to_not_found() {
        let app: AppError = ProxyError::UnknownVendor {
            index: 0,
            vendor_id: VendorId::new(),
        }
        .into();
        assert!(matches!(app, AppError::NotFound(_)));
    }

    #[test]
    fn test_other_errors_map_to_validation() {
        let app: AppError = ProxyError::ParentCancelled.into();
        assert!(matches!(app, AppError::Validation(_)));
        let app: AppError = ProxyError::NoSplits.into();
        assert!(matches!(app, AppError::Validation(_)));
    }
}
