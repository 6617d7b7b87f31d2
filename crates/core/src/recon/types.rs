//! Credit ledger domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use khata_shared::types::{BillId, ProxyBillId, VendorId};

use crate::billing::BillStatus;

/// Direction of a cash-flow event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CreditDirection {
    /// Money received by the tenant.
    Incoming,
    /// Money paid out by the tenant.
    Outgoing,
}

impl CreditDirection {
    /// Returns the string representation of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "INCOMING",
            Self::Outgoing => "OUTGOING",
        }
    }

    /// Parses a direction from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INCOMING" => Some(Self::Incoming),
            "OUTGOING" => Some(Self::Outgoing),
            _ => None,
        }
    }
}

impl fmt::Display for CreditDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Cheque.
    Cheque,
    /// Bank transfer (NEFT/RTGS/IMPS).
    BankTransfer,
    /// UPI.
    Upi,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Returns the string representation of the payment method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Cheque => "CHEQUE",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Upi => "UPI",
            Self::Other => "OTHER",
        }
    }

    /// Parses a payment method from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CASH" => Some(Self::Cash),
            "CHEQUE" => Some(Self::Cheque),
            "BANK_TRANSFER" => Some(Self::BankTransfer),
            "UPI" => Some(Self::Upi),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived payment state of a bill or proxy bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// No incoming payments recorded.
    Unpaid,
    /// Some, but not all, of the total received.
    PartiallyPaid,
    /// Paid in full (or beyond, which the cap makes unreachable).
    FullyPaid,
}

impl PaymentStatus {
    /// Returns the string representation of the payment status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::FullyPaid => "FULLY_PAID",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the container a payment is being applied to.
///
/// A container is a bill or proxy bill; the reconciliation engine only
/// needs its total, lifecycle status, and owning vendor.
#[derive(Debug, Clone, Copy)]
pub struct ContainerInfo {
    /// The container's total amount.
    pub amount_total: Decimal,
    /// The container's lifecycle status.
    pub status: BillStatus,
    /// The vendor the container belongs to.
    pub vendor_id: VendorId,
}

/// Input for creating a credit entry.
#[derive(Debug, Clone)]
pub struct CreditEntryInput {
    /// The vendor this cash event concerns.
    pub vendor_id: VendorId,
    /// Optional link to a bill. Mutually exclusive with `proxy_bill_id`.
    pub bill_id: Option<BillId>,
    /// Optional link to a proxy bill. Mutually exclusive with `bill_id`.
    pub proxy_bill_id: Option<ProxyBillId>,
    /// The amount moved (must be positive).
    pub amount: Decimal,
    /// Incoming or outgoing.
    pub direction: CreditDirection,
    /// How the payment was made.
    pub payment_method: PaymentMethod,
    /// When the payment was made.
    pub payment_date: NaiveDate,
    /// Optional reference (cheque number, UPI id, ...).
    pub reference_number: Option<String>,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// Per-vendor sums used to derive the outstanding balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorLedgerSnapshot {
    /// Sum of `amount_total` over the vendor's CONFIRMED bills.
    pub total_billed: Decimal,
    /// Sum of the vendor's INCOMING credit entries (bill-linked or not).
    pub total_incoming: Decimal,
    /// Sum of the vendor's OUTGOING credit entries.
    pub total_outgoing: Decimal,
}

/// Date-ranged collection sums.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionSummary {
    /// Sum of INCOMING entries in the range.
    pub total_incoming: Decimal,
    /// Sum of OUTGOING entries in the range.
    pub total_outgoing: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(CreditDirection::parse("INCOMING"), Some(CreditDirection::Incoming));
        assert_eq!(CreditDirection::parse("outgoing"), Some(CreditDirection::Outgoing));
        assert_eq!(CreditDirection::parse("SIDEWAYS"), None);
    }

    #[test]
    fn test_payment_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Cheque,
            PaymentMethod::BankTransfer,
            PaymentMethod::Upi,
            PaymentMethod::Other,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("BARTER"), None);
    }

    #[test]
    fn test_payment_status_strings() {
        assert_eq!(PaymentStatus::Unpaid.as_str(), "UNPAID");
        assert_eq!(PaymentStatus::PartiallyPaid.as_str(), "PARTIALLY_PAID");
        assert_eq!(PaymentStatus::FullyPaid.as_str(), "FULLY_PAID");
    }
}
