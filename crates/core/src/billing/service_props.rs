//! Property-based tests for BillingService.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use khata_shared::types::VendorId;

use super::service::BillingService;
use super::types::{BillItemInput, BillType, CreateBillInput};

/// Strategy to generate positive quantities (0.01 to 1,000.00).
fn positive_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|v| Decimal::new(v, 2))
}

/// Strategy to generate positive unit prices (0.01 to 100,000.00).
fn positive_price() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|v| Decimal::new(v, 2))
}

/// Strategy to generate a well-formed item.
fn item_strategy() -> impl Strategy<Value = BillItemInput> {
    (positive_quantity(), positive_price()).prop_map(|(quantity, unit_price)| BillItemInput {
        description: "Line item".to_string(),
        quantity,
        unit_price,
    })
}

/// Strategy to generate tax rates (0% to 40%).
fn tax_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=40i64).prop_map(|pct| Decimal::new(pct, 2))
}

fn make_input(items: Vec<BillItemInput>, rate: Decimal) -> CreateBillInput {
    CreateBillInput {
        vendor_id: VendorId::new(),
        bill_number: "BILL-PROP".to_string(),
        bill_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        bill_type: BillType::Purchase,
        tax_rate: rate,
        items,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any well-formed bill, the monetary triple satisfies
    /// total == subtotal + tax.
    #[test]
    fn prop_total_equals_subtotal_plus_tax(
        items in prop::collection::vec(item_strategy(), 1..8),
        rate in tax_rate(),
    ) {
        let input = make_input(items, rate);
        let resolved = BillingService::validate_and_resolve(&input).unwrap();

        prop_assert!(resolved.totals.is_consistent());
        prop_assert_eq!(
            resolved.totals.total,
            resolved.totals.subtotal + resolved.totals.tax
        );
    }

    /// For any well-formed bill, item amounts sum to the subtotal.
    #[test]
    fn prop_item_amounts_sum_to_subtotal(
        items in prop::collection::vec(item_strategy(), 1..8),
        rate in tax_rate(),
    ) {
        let input = make_input(items, rate);
        let resolved = BillingService::validate_and_resolve(&input).unwrap();

        let sum: Decimal = resolved.items.iter().map(|i| i.amount).sum();
        prop_assert_eq!(sum, resolved.totals.subtotal);
        prop_assert!(
            BillingService::verify_item_sum(&resolved.items, resolved.totals.subtotal).is_ok()
        );
    }

    /// Any bill containing a non-positive quantity is rejected whole.
    #[test]
    fn prop_non_positive_quantity_rejected(
        mut items in prop::collection::vec(item_strategy(), 1..5),
        bad_index in 0usize..5,
        rate in tax_rate(),
    ) {
        let index = bad_index % items.len();
        items[index].quantity = Decimal::ZERO;
        let input = make_input(items, rate);

        prop_assert!(BillingService::validate_and_resolve(&input).is_err());
    }
}
