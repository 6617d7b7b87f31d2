//! Reconciliation service: payment totals, remaining balances, and the
//! accept-payment check.
//!
//! All functions are pure over snapshots handed in by the caller. The
//! store itself never enforces the payment cap; enforcement lives here,
//! at the reconciliation boundary, and the service layer routes every
//! payment through it.

use rust_decimal::Decimal;

use super::error::ReconError;
use super::types::{
    CollectionSummary, ContainerInfo, CreditDirection, CreditEntryInput, PaymentStatus,
    VendorLedgerSnapshot,
};
use crate::billing::BillStatus;

/// Reconciliation service for payment computation and validation.
pub struct ReconService;

impl ReconService {
    /// Sums incoming payment amounts against a container.
    ///
    /// Returns zero (not null) when no entries exist.
    #[must_use]
    pub fn total_paid(incoming_amounts: &[Decimal]) -> Decimal {
        incoming_amounts.iter().copied().sum()
    }

    /// Computes the remaining balance of a container.
    ///
    /// # Errors
    ///
    /// Returns `ReconError::NegativeRemaining` if the ledger already
    /// holds more incoming than the total. That state is unreachable
    /// through the accept-payment path; observing it is a bug signal and
    /// is never clamped.
    pub fn remaining(amount_total: Decimal, total_paid: Decimal) -> Result<Decimal, ReconError> {
        let remaining = amount_total - total_paid;
        if remaining < Decimal::ZERO {
            return Err(ReconError::NegativeRemaining {
                total_paid,
                amount_total,
            });
        }
        Ok(remaining)
    }

    /// Derives the payment status of a container.
    ///
    /// Pure function of `total_paid` vs `amount_total`: zero paid is
    /// UNPAID, paid at or above the total is FULLY_PAID, anything in
    /// between is PARTIALLY_PAID. Equality counts as fully paid even
    /// with a remainder below the smallest currency unit.
    #[must_use]
    pub fn payment_status(amount_total: Decimal, total_paid: Decimal) -> PaymentStatus {
        if total_paid == Decimal::ZERO {
            PaymentStatus::Unpaid
        } else if total_paid >= amount_total {
            PaymentStatus::FullyPaid
        } else {
            PaymentStatus::PartiallyPaid
        }
    }

    /// Validates a payment against a container snapshot.
    ///
    /// This is the only path permitted to create a bill- or proxy-linked
    /// credit entry. The caller must compute `total_paid` from a
    /// consistent (locked) snapshot so concurrent payments cannot
    /// jointly overshoot the total.
    ///
    /// # Errors
    ///
    /// Returns `ReconError` if the amount is non-positive, the container
    /// is cancelled, or an incoming payment exceeds the remaining
    /// balance.
    pub fn validate_payment(
        container: &ContainerInfo,
        amount: Decimal,
        direction: CreditDirection,
        total_paid: Decimal,
    ) -> Result<(), ReconError> {
        if amount <= Decimal::ZERO {
            return Err(ReconError::NonPositiveAmount(amount));
        }
        if container.status == BillStatus::Cancelled {
            return Err(ReconError::ContainerCancelled);
        }

        if direction == CreditDirection::Incoming {
            let remaining = Self::remaining(container.amount_total, total_paid)?;
            if amount > remaining {
                return Err(ReconError::PaymentExceedsRemaining { amount, remaining });
            }
        }

        Ok(())
    }

    /// Validates a credit entry input's shape.
    ///
    /// # Errors
    ///
    /// Returns `ReconError` if the amount is non-positive or both
    /// container links are set.
    pub fn validate_entry(input: &CreditEntryInput) -> Result<(), ReconError> {
        if input.amount <= Decimal::ZERO {
            return Err(ReconError::NonPositiveAmount(input.amount));
        }
        if input.bill_id.is_some() && input.proxy_bill_id.is_some() {
            return Err(ReconError::BothContainers);
        }
        Ok(())
    }

    /// Validates that an entry's vendor matches its container's vendor.
    ///
    /// Applied on create and on the explicit edit path, which must
    /// preserve vendor consistency.
    ///
    /// # Errors
    ///
    /// Returns `ReconError::ContainerVendorMismatch` on disagreement.
    pub fn validate_container_vendor(
        input: &CreditEntryInput,
        container: &ContainerInfo,
    ) -> Result<(), ReconError> {
        if input.vendor_id != container.vendor_id {
            return Err(ReconError::ContainerVendorMismatch);
        }
        Ok(())
    }

    /// Computes a vendor's net outstanding balance.
    ///
    /// billed (CONFIRMED bills) - incoming + outgoing. Outgoing entries
    /// increase outstanding: they are the vendor's counter-claim against
    /// the tenant. Vendor-linked entries with no bill count too.
    #[must_use]
    pub fn vendor_outstanding(snapshot: &VendorLedgerSnapshot) -> Decimal {
        snapshot.total_billed - snapshot.total_incoming + snapshot.total_outgoing
    }

    /// Computes the net collected amount for a date-ranged summary.
    #[must_use]
    pub fn collection_net(summary: &CollectionSummary) -> Decimal {
        summary.total_incoming - summary.total_outgoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use khata_shared::types::{BillId, ProxyBillId, VendorId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use crate::recon::types::PaymentMethod;

    fn confirmed_container(total: Decimal) -> ContainerInfo {
        ContainerInfo {
            amount_total: total,
            status: BillStatus::Confirmed,
            vendor_id: VendorId::new(),
        }
    }

    fn make_entry(amount: Decimal) -> CreditEntryInput {
        CreditEntryInput {
            vendor_id: VendorId::new(),
            bill_id: None,
            proxy_bill_id: None,
            amount,
            direction: CreditDirection::Incoming,
            payment_method: PaymentMethod::Cash,
            payment_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            reference_number: None,
            notes: None,
        }
    }

    #[test]
    fn test_total_paid_empty_is_zero() {
        assert_eq!(ReconService::total_paid(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_total_paid_sums() {
        assert_eq!(
            ReconService::total_paid(&[dec!(500), dec!(180), dec!(0.50)]),
            dec!(680.50)
        );
    }

    #[test]
    fn test_remaining_normal() {
        assert_eq!(ReconService::remaining(dec!(1180), dec!(500)).unwrap(), dec!(680));
        assert_eq!(ReconService::remaining(dec!(1180), dec!(1180)).unwrap(), dec!(0));
    }

    #[test]
    fn test_remaining_negative_is_error_not_clamped() {
        assert!(matches!(
            ReconService::remaining(dec!(1180), dec!(1200)),
            Err(ReconError::NegativeRemaining { .. })
        ));
    }

    // 0 -> UNPAID; equal or above the total -> FULLY_PAID (even with a
    // remainder below the smallest currency unit); otherwise partial.
    #[rstest]
    #[case(dec!(1180), dec!(0), PaymentStatus::Unpaid)]
    #[case(dec!(1180), dec!(500), PaymentStatus::PartiallyPaid)]
    #[case(dec!(1180), dec!(1179.99), PaymentStatus::PartiallyPaid)]
    #[case(dec!(1180), dec!(1180), PaymentStatus::FullyPaid)]
    #[case(dec!(1180), dec!(1180.00), PaymentStatus::FullyPaid)]
    fn test_payment_status(
        #[case] total: Decimal,
        #[case] paid: Decimal,
        #[case] expected: PaymentStatus,
    ) {
        assert_eq!(ReconService::payment_status(total, paid), expected);
    }

    #[test]
    fn test_full_settlement_then_extra_rupee_rejected() {
        // Bill: subtotal 1000, tax 180, total 1180.
        let container = confirmed_container(dec!(1180));

        // Full payment succeeds.
        assert!(ReconService::validate_payment(
            &container,
            dec!(1180),
            CreditDirection::Incoming,
            dec!(0)
        )
        .is_ok());

        // Status is FULLY_PAID after the first call.
        assert_eq!(
            ReconService::payment_status(dec!(1180), dec!(1180)),
            PaymentStatus::FullyPaid
        );

        // One more rupee is rejected: remaining is 0.
        assert!(matches!(
            ReconService::validate_payment(
                &container,
                dec!(1),
                CreditDirection::Incoming,
                dec!(1180)
            ),
            Err(ReconError::PaymentExceedsRemaining { .. })
        ));
    }

    #[test]
    fn test_partial_then_overshoot_rejected() {
        let container = confirmed_container(dec!(1180));

        assert!(ReconService::validate_payment(
            &container,
            dec!(500),
            CreditDirection::Incoming,
            dec!(0)
        )
        .is_ok());

        // Remaining after the first payment is 680 < 700.
        let err = ReconService::validate_payment(
            &container,
            dec!(700),
            CreditDirection::Incoming,
            dec!(500),
        )
        .unwrap_err();
        match err {
            ReconError::PaymentExceedsRemaining { amount, remaining } => {
                assert_eq!(amount, dec!(700));
                assert_eq!(remaining, dec!(680));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_payment_rejects_non_positive_amounts() {
        let container = confirmed_container(dec!(1180));
        assert!(matches!(
            ReconService::validate_payment(
                &container,
                dec!(0),
                CreditDirection::Incoming,
                dec!(0)
            ),
            Err(ReconError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            ReconService::validate_payment(
                &container,
                dec!(-5),
                CreditDirection::Outgoing,
                dec!(0)
            ),
            Err(ReconError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_payment_rejects_cancelled_container() {
        let container = ContainerInfo {
            amount_total: dec!(1180),
            status: BillStatus::Cancelled,
            vendor_id: VendorId::new(),
        };
        assert!(matches!(
            ReconService::validate_payment(
                &container,
                dec!(100),
                CreditDirection::Incoming,
                dec!(0)
            ),
            Err(ReconError::ContainerCancelled)
        ));
    }

    #[test]
    fn test_outgoing_payments_are_uncapped() {
        let container = confirmed_container(dec!(1180));
        // An outgoing refund larger than the total is not capped.
        assert!(ReconService::validate_payment(
            &container,
            dec!(5000),
            CreditDirection::Outgoing,
            dec!(1180)
        )
        .is_ok());
    }

    #[test]
    fn test_draft_container_accepts_payments() {
        let container = ContainerInfo {
            amount_total: dec!(1180),
            status: BillStatus::Draft,
            vendor_id: VendorId::new(),
        };
        assert!(ReconService::validate_payment(
            &container,
            dec!(100),
            CreditDirection::Incoming,
            dec!(0)
        )
        .is_ok());
    }

    #[test]
    fn test_validate_entry_rejects_both_containers() {
        let mut entry = make_entry(dec!(100));
        entry.bill_id = Some(BillId::new());
        entry.proxy_bill_id = Some(ProxyBillId::new());
        assert!(matches!(
            ReconService::validate_entry(&entry),
            Err(ReconError::BothContainers)
        ));
    }

    #[test]
    fn test_validate_entry_accepts_single_or_no_container() {
        let entry = make_entry(dec!(100));
        assert!(ReconService::validate_entry(&entry).is_ok());

        let mut entry = make_entry(dec!(100));
        entry.bill_id = Some(BillId::new());
        assert!(ReconService::validate_entry(&entry).is_ok());

        let mut entry = make_entry(dec!(100));
        entry.proxy_bill_id = Some(ProxyBillId::new());
        assert!(ReconService::validate_entry(&entry).is_ok());
    }

    #[test]
    fn test_validate_entry_rejects_non_positive_amount() {
        assert!(matches!(
            ReconService::validate_entry(&make_entry(dec!(0))),
            Err(ReconError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_container_vendor_must_match() {
        let container = confirmed_container(dec!(1180));
        let mut entry = make_entry(dec!(100));
        entry.bill_id = Some(BillId::new());

        assert!(matches!(
            ReconService::validate_container_vendor(&entry, &container),
            Err(ReconError::ContainerVendorMismatch)
        ));

        entry.vendor_id = container.vendor_id;
        assert!(ReconService::validate_container_vendor(&entry, &container).is_ok());
    }

    #[test]
    fn test_vendor_outstanding_formula() {
        let snapshot = VendorLedgerSnapshot {
            total_billed: dec!(10000),
            total_incoming: dec!(4000),
            total_outgoing: dec!(500),
        };
        // billed - incoming + outgoing
        assert_eq!(ReconService::vendor_outstanding(&snapshot), dec!(6500));
    }

    #[test]
    fn test_vendor_outstanding_can_go_negative() {
        // Advance payments with nothing billed yet.
        let snapshot = VendorLedgerSnapshot {
            total_billed: dec!(0),
            total_incoming: dec!(2500),
            total_outgoing: dec!(0),
        };
        assert_eq!(ReconService::vendor_outstanding(&snapshot), dec!(-2500));
    }

    #[test]
    fn test_collection_net() {
        let summary = CollectionSummary {
            total_incoming: dec!(9000),
            total_outgoing: dec!(2500),
        };
        assert_eq!(ReconService::collection_net(&summary), dec!(6500));
    }
}
