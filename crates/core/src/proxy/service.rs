//! Proxy split resolution service.

use std::collections::HashSet;

use khata_shared::types::VendorId;

use super::error::ProxyError;
use super::types::{ProxySplitSpec, ResolvedProxyBill};
use crate::billing::{BillStatus, BillingService};

/// Proxy split service: validates and resolves a whole split batch.
pub struct ProxyService;

impl ProxyService {
    /// Validate and resolve a bill split into N proxy bills.
    ///
    /// Resolution is all-or-nothing: every spec is checked (non-empty
    /// unique proxy numbers, known vendors, well-formed items) and either
    /// all N resolved proxies are returned or the whole batch is
    /// rejected. The caller persists them in one transaction so no
    /// partial split can ever land.
    ///
    /// # Arguments
    ///
    /// * `parent_status` - The parent bill's lifecycle status
    /// * `specs` - One spec per proxy bill to create
    /// * `vendor_exists` - Tenant-scoped vendor existence lookup
    ///
    /// # Errors
    ///
    /// Returns `ProxyError` describing the first offending spec.
    pub fn resolve_splits<V>(
        parent_status: BillStatus,
        specs: &[ProxySplitSpec],
        vendor_exists: V,
    ) -> Result<Vec<ResolvedProxyBill>, ProxyError>
    where
        V: Fn(VendorId) -> bool,
    {
        if parent_status == BillStatus::Cancelled {
            return Err(ProxyError::ParentCancelled);
        }
        if specs.is_empty() {
            return Err(ProxyError::NoSplits);
        }

        let mut seen_numbers = HashSet::new();
        let mut resolved = Vec::with_capacity(specs.len());

        for (index, spec) in specs.iter().enumerate() {
            let number = spec.proxy_number.trim();
            if number.is_empty() {
                return Err(ProxyError::EmptyProxyNumber(index));
            }
            if !seen_numbers.insert(number.to_string()) {
                return Err(ProxyError::DuplicateNumberInSplit(number.to_string()));
            }
            if !vendor_exists(spec.vendor_id) {
                return Err(ProxyError::UnknownVendor {
                    index,
                    vendor_id: spec.vendor_id,
                });
            }

            let (items, total) = BillingService::resolve_items(&spec.items)
                .map_err(|source| ProxyError::InvalidItems { index, source })?;

            resolved.push(ResolvedProxyBill {
                proxy_number: spec.proxy_number.clone(),
                vendor_id: spec.vendor_id,
                items,
                amount_total: total,
            });
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::billing::types::BillItemInput;

    fn make_item(quantity: Decimal, unit_price: Decimal) -> BillItemInput {
        BillItemInput {
            description: "Split line".to_string(),
            quantity,
            unit_price,
        }
    }

    fn make_spec(number: &str, vendor_id: VendorId) -> ProxySplitSpec {
        ProxySplitSpec {
            proxy_number: number.to_string(),
            vendor_id,
            items: vec![make_item(dec!(2), dec!(250))],
        }
    }

    #[test]
    fn test_resolve_n_well_formed_splits() {
        let vendor = VendorId::new();
        let specs = vec![
            make_spec("PX-001", vendor),
            make_spec("PX-002", vendor),
            make_spec("PX-003", vendor),
        ];

        let resolved =
            ProxyService::resolve_splits(BillStatus::Confirmed, &specs, |_| true).unwrap();

        assert_eq!(resolved.len(), 3);
        for proxy in &resolved {
            assert_eq!(proxy.amount_total, dec!(500.00));
            let item_sum: Decimal = proxy.items.iter().map(|i| i.amount).sum();
            assert_eq!(item_sum, proxy.amount_total);
        }
    }

    #[test]
    fn test_one_bad_vendor_rejects_whole_batch() {
        let good = VendorId::new();
        let bad = VendorId::new();
        let specs = vec![
            make_spec("PX-001", good),
            make_spec("PX-002", bad),
            make_spec("PX-003", good),
        ];

        let result =
            ProxyService::resolve_splits(BillStatus::Confirmed, &specs, |v| v == good);

        assert!(matches!(
            result,
            Err(ProxyError::UnknownVendor { index: 1, .. })
        ));
    }

    #[test]
    fn test_one_bad_item_rejects_whole_batch() {
        let vendor = VendorId::new();
        let mut specs = vec![make_spec("PX-001", vendor), make_spec("PX-002", vendor)];
        specs[1].items[0].quantity = dec!(0);

        let result = ProxyService::resolve_splits(BillStatus::Confirmed, &specs, |_| true);
        assert!(matches!(result, Err(ProxyError::InvalidItems { index: 1, .. })));
    }

    #[test]
    fn test_cancelled_parent_rejected() {
        let specs = vec![make_spec("PX-001", VendorId::new())];
        assert!(matches!(
            ProxyService::resolve_splits(BillStatus::Cancelled, &specs, |_| true),
            Err(ProxyError::ParentCancelled)
        ));
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            ProxyService::resolve_splits(BillStatus::Draft, &[], |_| true),
            Err(ProxyError::NoSplits)
        ));
    }

    #[test]
    fn test_duplicate_number_in_batch_rejected() {
        let vendor = VendorId::new();
        let specs = vec![make_spec("PX-001", vendor), make_spec("PX-001", vendor)];
        assert!(matches!(
            ProxyService::resolve_splits(BillStatus::Draft, &specs, |_| true),
            Err(ProxyError::DuplicateNumberInSplit(_))
        ));
    }

    #[test]
    fn test_blank_proxy_number_rejected() {
        let mut spec = make_spec("  ", VendorId::new());
        spec.proxy_number = "  ".to_string();
        assert!(matches!(
            ProxyService::resolve_splits(BillStatus::Draft, &[spec], |_| true),
            Err(ProxyError::EmptyProxyNumber(0))
        ));
    }

    #[test]
    fn test_proxy_may_use_different_vendor_than_parent() {
        // The vendor lookup is the only vendor constraint; reassignment
        // to any existing vendor is allowed.
        let other_vendor = VendorId::new();
        let specs = vec![make_spec("PX-001", other_vendor)];
        let resolved =
            ProxyService::resolve_splits(BillStatus::Confirmed, &specs, |_| true).unwrap();
        assert_eq!(resolved[0].vendor_id, other_vendor);
    }
}
