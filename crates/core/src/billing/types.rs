//! Bill domain types for creation and validation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use khata_shared::types::{UserId, VendorId};

/// Bill lifecycle status.
///
/// Bills start in draft; confirmation and cancellation are one-way with
/// respect to each other. Confirmed and cancelled bills accept no item
/// edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BillStatus {
    /// Bill is being drafted and its items can still change.
    Draft,
    /// Bill is confirmed and counts toward vendor outstanding.
    Confirmed,
    /// Bill is cancelled. No new items, splits, or payments.
    Cancelled,
}

impl BillStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the bill's items can be modified.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true once the bill has reached a terminal state for edits.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bill classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BillType {
    /// A purchase from a supplier.
    Purchase,
    /// A sale to a customer.
    Sale,
}

impl BillType {
    /// Returns the string representation of the bill type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "PURCHASE",
            Self::Sale => "SALE",
        }
    }

    /// Parses a bill type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PURCHASE" => Some(Self::Purchase),
            "SALE" => Some(Self::Sale),
            _ => None,
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for a single bill line item.
#[derive(Debug, Clone)]
pub struct BillItemInput {
    /// What was bought or sold.
    pub description: String,
    /// Quantity (must be positive).
    pub quantity: Decimal,
    /// Price per unit (must be positive).
    pub unit_price: Decimal,
}

/// A line item with its amount computed (quantity x unit price).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    /// What was bought or sold.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// quantity x unit price, rounded to the money scale.
    pub amount: Decimal,
}

/// Input for creating a new bill.
#[derive(Debug, Clone)]
pub struct CreateBillInput {
    /// The vendor this bill belongs to.
    pub vendor_id: VendorId,
    /// Bill number, unique per tenant.
    pub bill_number: String,
    /// Date on the bill.
    pub bill_date: NaiveDate,
    /// Purchase or sale.
    pub bill_type: BillType,
    /// Tax rate applied to the subtotal (e.g. 0.18 for 18% GST).
    pub tax_rate: Decimal,
    /// Line items (at least one).
    pub items: Vec<BillItemInput>,
}

/// The monetary triple carried by every bill.
///
/// `total == subtotal + tax` holds by construction and must never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillTotals {
    /// Sum of item amounts.
    pub subtotal: Decimal,
    /// Tax on the subtotal.
    pub tax: Decimal,
    /// subtotal + tax.
    pub total: Decimal,
}

impl BillTotals {
    /// Creates totals from a subtotal and tax amount.
    #[must_use]
    pub fn new(subtotal: Decimal, tax: Decimal) -> Self {
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Returns true if the stored triple satisfies the ledger invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total == self.subtotal + self.tax
    }
}

/// Result of validating and resolving a new bill.
#[derive(Debug, Clone)]
pub struct ResolvedBill {
    /// Items with amounts computed.
    pub items: Vec<ResolvedItem>,
    /// Subtotal, tax, and total.
    pub totals: BillTotals,
}

/// The per-record visibility flag with its paired stamp.
///
/// `is_authorized == true` implies both `authorized_by` and
/// `authorized_at` are set; `false` implies both are cleared. The flag
/// governs visibility to the restricted role, not lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillAuthorization {
    /// Whether the restricted role may see this bill.
    pub is_authorized: bool,
    /// Who authorized it.
    pub authorized_by: Option<UserId>,
    /// When it was authorized.
    pub authorized_at: Option<DateTime<Utc>>,
}

impl BillAuthorization {
    /// An unauthorized state with both stamp fields cleared.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            is_authorized: false,
            authorized_by: None,
            authorized_at: None,
        }
    }

    /// An authorized state stamped with who and when.
    #[must_use]
    pub const fn granted(by: UserId, at: DateTime<Utc>) -> Self {
        Self {
            is_authorized: true,
            authorized_by: Some(by),
            authorized_at: Some(at),
        }
    }

    /// Returns true if the flag and its stamp fields agree.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        if self.is_authorized {
            self.authorized_by.is_some() && self.authorized_at.is_some()
        } else {
            self.authorized_by.is_none() && self.authorized_at.is_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bill_status_editable() {
        assert!(BillStatus::Draft.is_editable());
        assert!(!BillStatus::Confirmed.is_editable());
        assert!(!BillStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_bill_status_terminal() {
        assert!(!BillStatus::Draft.is_terminal());
        assert!(BillStatus::Confirmed.is_terminal());
        assert!(BillStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_bill_status_round_trip() {
        for status in [BillStatus::Draft, BillStatus::Confirmed, BillStatus::Cancelled] {
            assert_eq!(BillStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BillStatus::parse("draft"), Some(BillStatus::Draft));
        assert_eq!(BillStatus::parse("VOID"), None);
    }

    #[test]
    fn test_bill_type_round_trip() {
        assert_eq!(BillType::parse("PURCHASE"), Some(BillType::Purchase));
        assert_eq!(BillType::parse("sale"), Some(BillType::Sale));
        assert_eq!(BillType::parse("RETURN"), None);
    }

    #[test]
    fn test_totals_consistent_by_construction() {
        let totals = BillTotals::new(dec!(1000), dec!(180));
        assert_eq!(totals.total, dec!(1180));
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_totals_detect_drift() {
        let mut totals = BillTotals::new(dec!(1000), dec!(180));
        totals.total = dec!(1200);
        assert!(!totals.is_consistent());
    }

    #[test]
    fn test_authorization_consistency() {
        let cleared = BillAuthorization::cleared();
        assert!(cleared.is_consistent());
        assert!(!cleared.is_authorized);

        let granted = BillAuthorization::granted(UserId::new(), Utc::now());
        assert!(granted.is_consistent());
        assert!(granted.is_authorized);

        let broken = BillAuthorization {
            is_authorized: true,
            authorized_by: None,
            authorized_at: None,
        };
        assert!(!broken.is_consistent());

        let stale_stamp = BillAuthorization {
            is_authorized: false,
            authorized_by: Some(UserId::new()),
            authorized_at: None,
        };
        assert!(!stale_stamp.is_consistent());
    }
}
