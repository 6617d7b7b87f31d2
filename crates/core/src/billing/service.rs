//! Billing service for bill validation and resolution.
//!
//! Pure business logic with no database dependencies: validates item
//! inputs, computes the monetary triple, and enforces lifecycle rules
//! before anything is persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use khata_shared::types::{line_amount, round_money, UserId};

use super::error::BillingError;
use super::types::{
    BillAuthorization, BillItemInput, BillStatus, BillTotals, CreateBillInput, ResolvedBill,
    ResolvedItem,
};

/// Billing service for bill validation and resolution.
pub struct BillingService;

impl BillingService {
    /// The default tax rate applied when the caller does not override it
    /// (18% GST).
    #[must_use]
    pub fn default_tax_rate() -> Decimal {
        Decimal::new(18, 2)
    }

    /// Validate and resolve a new bill before persisting.
    ///
    /// Validates the bill number, resolves each item's amount, and
    /// computes subtotal, tax, and total. The returned totals satisfy
    /// `total == subtotal + tax` by construction, and the item amounts
    /// sum to the subtotal.
    ///
    /// # Errors
    ///
    /// Returns `BillingError` if the bill number is empty, the tax rate
    /// is negative, there are no items, or any item is malformed.
    pub fn validate_and_resolve(input: &CreateBillInput) -> Result<ResolvedBill, BillingError> {
        if input.bill_number.trim().is_empty() {
            return Err(BillingError::EmptyBillNumber);
        }
        if input.tax_rate < Decimal::ZERO {
            return Err(BillingError::NegativeTaxRate(input.tax_rate));
        }

        let (items, subtotal) = Self::resolve_items(&input.items)?;
        let tax = round_money(subtotal * input.tax_rate);

        Ok(ResolvedBill {
            items,
            totals: BillTotals::new(subtotal, tax),
        })
    }

    /// Resolve line items, computing each amount and the subtotal.
    ///
    /// # Errors
    ///
    /// Returns `BillingError` if the item list is empty or any item has
    /// an empty description or non-positive quantity/price.
    pub fn resolve_items(
        items: &[BillItemInput],
    ) -> Result<(Vec<ResolvedItem>, Decimal), BillingError> {
        if items.is_empty() {
            return Err(BillingError::NoItems);
        }

        let mut resolved = Vec::with_capacity(items.len());
        let mut subtotal = Decimal::ZERO;

        for (index, item) in items.iter().enumerate() {
            if item.description.trim().is_empty() {
                return Err(BillingError::EmptyItemDescription(index));
            }
            if item.quantity <= Decimal::ZERO {
                return Err(BillingError::NonPositiveQuantity {
                    index,
                    quantity: item.quantity,
                });
            }
            if item.unit_price <= Decimal::ZERO {
                return Err(BillingError::NonPositiveUnitPrice {
                    index,
                    unit_price: item.unit_price,
                });
            }

            let amount = line_amount(item.quantity, item.unit_price);
            subtotal += amount;

            resolved.push(ResolvedItem {
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                amount,
            });
        }

        Ok((resolved, subtotal))
    }

    /// Verify a stored bill still satisfies its monetary invariants.
    ///
    /// Called on read paths; a failure here signals corruption, not bad
    /// input.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::TotalMismatch` when the triple drifted.
    pub fn verify_totals(totals: &BillTotals) -> Result<(), BillingError> {
        if !totals.is_consistent() {
            return Err(BillingError::TotalMismatch {
                subtotal: totals.subtotal,
                tax: totals.tax,
                total: totals.total,
            });
        }
        Ok(())
    }

    /// Verify that item amounts sum to the stated subtotal.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::ItemSumMismatch` on disagreement.
    pub fn verify_item_sum(items: &[ResolvedItem], subtotal: Decimal) -> Result<(), BillingError> {
        let actual: Decimal = items.iter().map(|i| i.amount).sum();
        if actual != subtotal {
            return Err(BillingError::ItemSumMismatch {
                expected: subtotal,
                actual,
            });
        }
        Ok(())
    }

    /// Validate that a bill can transition to confirmed.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NotDraft` unless the bill is in draft.
    pub fn validate_can_confirm(status: BillStatus) -> Result<(), BillingError> {
        if status != BillStatus::Draft {
            return Err(BillingError::NotDraft(status));
        }
        Ok(())
    }

    /// Validate that a bill can transition to cancelled.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::AlreadyCancelled` if it already is.
    pub fn validate_can_cancel(status: BillStatus) -> Result<(), BillingError> {
        if status == BillStatus::Cancelled {
            return Err(BillingError::AlreadyCancelled);
        }
        Ok(())
    }

    /// Validate that a bill's items can still be modified.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::ItemsImmutable` once the bill left draft.
    pub fn validate_items_editable(status: BillStatus) -> Result<(), BillingError> {
        if !status.is_editable() {
            return Err(BillingError::ItemsImmutable(status));
        }
        Ok(())
    }

    /// Grant the visibility flag, stamping who and when.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::AlreadyAuthorized` if the flag is set.
    pub fn grant_authorization(
        current: &BillAuthorization,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Result<BillAuthorization, BillingError> {
        if current.is_authorized {
            return Err(BillingError::AlreadyAuthorized);
        }
        Ok(BillAuthorization::granted(by, at))
    }

    /// Revoke the visibility flag, clearing the stamp.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NotAuthorized` if the flag is not set.
    pub fn revoke_authorization(
        current: &BillAuthorization,
    ) -> Result<BillAuthorization, BillingError> {
        if !current.is_authorized {
            return Err(BillingError::NotAuthorized);
        }
        Ok(BillAuthorization::cleared())
    }

    /// Verify a stored authorization flag agrees with its stamp.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InconsistentAuthorization` on disagreement.
    pub fn verify_authorization(auth: &BillAuthorization) -> Result<(), BillingError> {
        if !auth.is_consistent() {
            return Err(BillingError::InconsistentAuthorization);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use khata_shared::types::VendorId;
    use rust_decimal_macros::dec;

    use crate::billing::types::BillType;

    fn make_item(description: &str, quantity: Decimal, unit_price: Decimal) -> BillItemInput {
        BillItemInput {
            description: description.to_string(),
            quantity,
            unit_price,
        }
    }

    fn make_input(items: Vec<BillItemInput>) -> CreateBillInput {
        CreateBillInput {
            vendor_id: VendorId::new(),
            bill_number: "BILL-001".to_string(),
            bill_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            bill_type: BillType::Purchase,
            tax_rate: BillingService::default_tax_rate(),
            items,
        }
    }

    #[test]
    fn test_resolve_simple_bill() {
        let input = make_input(vec![
            make_item("Cement bags", dec!(10), dec!(50)),
            make_item("Steel rods", dec!(5), dec!(100)),
        ]);

        let resolved = BillingService::validate_and_resolve(&input).unwrap();
        assert_eq!(resolved.items.len(), 2);
        assert_eq!(resolved.items[0].amount, dec!(500.00));
        assert_eq!(resolved.items[1].amount, dec!(500.00));
        assert_eq!(resolved.totals.subtotal, dec!(1000.00));
        assert_eq!(resolved.totals.tax, dec!(180.00));
        assert_eq!(resolved.totals.total, dec!(1180.00));
        assert!(resolved.totals.is_consistent());
    }

    #[test]
    fn test_resolve_rejects_empty_items() {
        let input = make_input(vec![]);
        assert!(matches!(
            BillingService::validate_and_resolve(&input),
            Err(BillingError::NoItems)
        ));
    }

    #[test]
    fn test_resolve_rejects_blank_description() {
        let input = make_input(vec![make_item("   ", dec!(1), dec!(10))]);
        assert!(matches!(
            BillingService::validate_and_resolve(&input),
            Err(BillingError::EmptyItemDescription(0))
        ));
    }

    #[test]
    fn test_resolve_rejects_non_positive_quantity() {
        let input = make_input(vec![make_item("Bricks", dec!(0), dec!(10))]);
        assert!(matches!(
            BillingService::validate_and_resolve(&input),
            Err(BillingError::NonPositiveQuantity { index: 0, .. })
        ));

        let input = make_input(vec![make_item("Bricks", dec!(-2), dec!(10))]);
        assert!(matches!(
            BillingService::validate_and_resolve(&input),
            Err(BillingError::NonPositiveQuantity { index: 0, .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_non_positive_price() {
        let input = make_input(vec![make_item("Bricks", dec!(2), dec!(0))]);
        assert!(matches!(
            BillingService::validate_and_resolve(&input),
            Err(BillingError::NonPositiveUnitPrice { index: 0, .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_empty_bill_number() {
        let mut input = make_input(vec![make_item("Bricks", dec!(1), dec!(10))]);
        input.bill_number = "  ".to_string();
        assert!(matches!(
            BillingService::validate_and_resolve(&input),
            Err(BillingError::EmptyBillNumber)
        ));
    }

    #[test]
    fn test_resolve_rejects_negative_tax_rate() {
        let mut input = make_input(vec![make_item("Bricks", dec!(1), dec!(10))]);
        input.tax_rate = dec!(-0.05);
        assert!(matches!(
            BillingService::validate_and_resolve(&input),
            Err(BillingError::NegativeTaxRate(_))
        ));
    }

    #[test]
    fn test_zero_tax_rate_is_allowed() {
        let mut input = make_input(vec![make_item("Bricks", dec!(1), dec!(100))]);
        input.tax_rate = Decimal::ZERO;
        let resolved = BillingService::validate_and_resolve(&input).unwrap();
        assert_eq!(resolved.totals.tax, dec!(0.00));
        assert_eq!(resolved.totals.total, resolved.totals.subtotal);
    }

    #[test]
    fn test_item_sum_matches_subtotal() {
        let input = make_input(vec![
            make_item("A", dec!(3), dec!(33.33)),
            make_item("B", dec!(7), dec!(14.285)),
        ]);
        let resolved = BillingService::validate_and_resolve(&input).unwrap();
        assert!(
            BillingService::verify_item_sum(&resolved.items, resolved.totals.subtotal).is_ok()
        );
    }

    #[test]
    fn test_verify_totals_detects_drift() {
        let mut totals = BillTotals::new(dec!(1000), dec!(180));
        assert!(BillingService::verify_totals(&totals).is_ok());

        totals.total = dec!(1100);
        assert!(matches!(
            BillingService::verify_totals(&totals),
            Err(BillingError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn test_confirm_requires_draft() {
        assert!(BillingService::validate_can_confirm(BillStatus::Draft).is_ok());
        assert!(matches!(
            BillingService::validate_can_confirm(BillStatus::Confirmed),
            Err(BillingError::NotDraft(BillStatus::Confirmed))
        ));
        assert!(matches!(
            BillingService::validate_can_confirm(BillStatus::Cancelled),
            Err(BillingError::NotDraft(BillStatus::Cancelled))
        ));
    }

    #[test]
    fn test_cancel_rejects_already_cancelled() {
        assert!(BillingService::validate_can_cancel(BillStatus::Draft).is_ok());
        assert!(BillingService::validate_can_cancel(BillStatus::Confirmed).is_ok());
        assert!(matches!(
            BillingService::validate_can_cancel(BillStatus::Cancelled),
            Err(BillingError::AlreadyCancelled)
        ));
    }

    #[test]
    fn test_items_editable_only_in_draft() {
        assert!(BillingService::validate_items_editable(BillStatus::Draft).is_ok());
        assert!(matches!(
            BillingService::validate_items_editable(BillStatus::Confirmed),
            Err(BillingError::ItemsImmutable(BillStatus::Confirmed))
        ));
        assert!(matches!(
            BillingService::validate_items_editable(BillStatus::Cancelled),
            Err(BillingError::ItemsImmutable(BillStatus::Cancelled))
        ));
    }

    #[test]
    fn test_grant_authorization_stamps_both_fields() {
        let user = UserId::new();
        let at = Utc::now();
        let auth =
            BillingService::grant_authorization(&BillAuthorization::cleared(), user, at).unwrap();
        assert!(auth.is_authorized);
        assert_eq!(auth.authorized_by, Some(user));
        assert_eq!(auth.authorized_at, Some(at));
        assert!(auth.is_consistent());
    }

    #[test]
    fn test_grant_rejects_already_authorized() {
        let granted = BillAuthorization::granted(UserId::new(), Utc::now());
        assert!(matches!(
            BillingService::grant_authorization(&granted, UserId::new(), Utc::now()),
            Err(BillingError::AlreadyAuthorized)
        ));
    }

    #[test]
    fn test_revoke_clears_both_fields() {
        let granted = BillAuthorization::granted(UserId::new(), Utc::now());
        let cleared = BillingService::revoke_authorization(&granted).unwrap();
        assert!(!cleared.is_authorized);
        assert_eq!(cleared.authorized_by, None);
        assert_eq!(cleared.authorized_at, None);
        assert!(cleared.is_consistent());
    }

    #[test]
    fn test_revoke_rejects_unauthorized() {
        assert!(matches!(
            BillingService::revoke_authorization(&BillAuthorization::cleared()),
            Err(BillingError::NotAuthorized)
        ));
    }

    #[test]
    fn test_verify_authorization() {
        assert!(BillingService::verify_authorization(&BillAuthorization::cleared()).is_ok());
        let broken = BillAuthorization {
            is_authorized: true,
            authorized_by: Some(UserId::new()),
            authorized_at: None,
        };
        assert!(matches!(
            BillingService::verify_authorization(&broken),
            Err(BillingError::InconsistentAuthorization)
        ));
    }
}
