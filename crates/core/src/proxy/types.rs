//! Proxy bill domain types.

use rust_decimal::Decimal;

use khata_shared::types::VendorId;

use crate::billing::types::{BillItemInput, ResolvedItem};

/// Specification of one proxy bill in a split.
#[derive(Debug, Clone)]
pub struct ProxySplitSpec {
    /// Proxy number, unique per tenant.
    pub proxy_number: String,
    /// The vendor this proxy is assigned to. May differ from the parent
    /// bill's vendor.
    pub vendor_id: VendorId,
    /// Line items for this proxy.
    pub items: Vec<BillItemInput>,
}

/// A fully resolved proxy bill, ready to persist.
#[derive(Debug, Clone)]
pub struct ResolvedProxyBill {
    /// Proxy number.
    pub proxy_number: String,
    /// Assigned vendor.
    pub vendor_id: VendorId,
    /// Items with amounts computed.
    pub items: Vec<ResolvedItem>,
    /// Sum of item amounts.
    pub amount_total: Decimal,
}
