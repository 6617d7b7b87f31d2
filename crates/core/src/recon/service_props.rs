//! Property-based tests for ReconService.

use proptest::prelude::*;
use rust_decimal::Decimal;

use khata_shared::types::VendorId;

use super::service::ReconService;
use super::types::{ContainerInfo, CreditDirection, PaymentStatus};
use crate::billing::BillStatus;

/// Strategy to generate positive decimal amounts (0.01 to 100,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn container(total: Decimal) -> ContainerInfo {
    ContainerInfo {
        amount_total: total,
        status: BillStatus::Confirmed,
        vendor_id: VendorId::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any sequence of attempted payments, applying only the ones the
    /// validator accepts keeps total paid at or below the container total.
    /// A rejected payment leaves the running total unchanged.
    #[test]
    fn prop_total_paid_never_exceeds_total(
        total in positive_amount(),
        attempts in prop::collection::vec(positive_amount(), 1..20),
    ) {
        let info = container(total);
        let mut paid = Decimal::ZERO;

        for amount in attempts {
            let before = paid;
            match ReconService::validate_payment(
                &info,
                amount,
                CreditDirection::Incoming,
                paid,
            ) {
                Ok(()) => paid += amount,
                Err(_) => prop_assert_eq!(paid, before),
            }
            prop_assert!(paid <= total, "paid {} exceeded total {}", paid, total);
        }

        // Remaining is always derivable without a negative result.
        prop_assert!(ReconService::remaining(total, paid).is_ok());
    }

    /// payment_status is a pure function of total_paid vs amount_total.
    #[test]
    fn prop_payment_status_purity(
        total in positive_amount(),
        paid in (0i64..20_000_000i64).prop_map(|c| Decimal::new(c, 2)),
    ) {
        let status = ReconService::payment_status(total, paid);
        let expected = if paid == Decimal::ZERO {
            PaymentStatus::Unpaid
        } else if paid >= total {
            PaymentStatus::FullyPaid
        } else {
            PaymentStatus::PartiallyPaid
        };
        prop_assert_eq!(status, expected);

        // Same inputs, same answer.
        prop_assert_eq!(status, ReconService::payment_status(total, paid));
    }

    /// A payment exactly equal to the remaining balance is always
    /// accepted and lands the container on FULLY_PAID.
    #[test]
    fn prop_exact_settlement_accepted(
        total in positive_amount(),
        first in positive_amount(),
    ) {
        let info = container(total);
        let first = first.min(total);
        prop_assume!(first < total);

        prop_assert!(ReconService::validate_payment(
            &info, first, CreditDirection::Incoming, Decimal::ZERO
        ).is_ok());

        let remaining = ReconService::remaining(total, first).unwrap();
        prop_assert!(ReconService::validate_payment(
            &info, remaining, CreditDirection::Incoming, first
        ).is_ok());

        prop_assert_eq!(
            ReconService::payment_status(total, first + remaining),
            PaymentStatus::FullyPaid
        );
    }
}
