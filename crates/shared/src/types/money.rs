//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations. All monetary
//! amounts are `rust_decimal::Decimal`, rounded to 2 decimal places with
//! banker's rounding (round half to even) to minimize cumulative errors.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for stored monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary amount to the stored scale using banker's rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Computes a line amount as quantity x unit price, rounded to the stored
/// scale.
#[must_use]
pub fn line_amount(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity * unit_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_passthrough() {
        assert_eq!(round_money(dec!(100.00)), dec!(100.00));
        assert_eq!(round_money(dec!(0)), dec!(0));
    }

    // Round half to even: 2.5 cents rounds down, 3.5 cents rounds up
    #[rstest]
    #[case(dec!(0.025), dec!(0.02))]
    #[case(dec!(0.035), dec!(0.04))]
    #[case(dec!(1.005), dec!(1.00))]
    #[case(dec!(1.015), dec!(1.02))]
    fn test_bankers_rounding(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_line_amount() {
        assert_eq!(line_amount(dec!(3), dec!(99.99)), dec!(299.97));
        assert_eq!(line_amount(dec!(0.5), dec!(10)), dec!(5.00));
        // 7 x 14.285 = 99.995 -> rounds half to even at 2dp
        assert_eq!(line_amount(dec!(7), dec!(14.285)), dec!(100.00));
    }
}
