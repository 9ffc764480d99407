// src/pricing.rs
//! Order-line pricing.
//!
//! A line's total is `price * quantity * (1 - discount_percentage)` rounded to
//! two decimals, half away from zero. The percentage always comes from the
//! order's discount; a missing discount counts as zero. Nothing here checks
//! whether a discount is still usable, see `Discount::check_applicable`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to 2 decimal places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_total(price: Decimal, quantity: i32, discount_percentage: Option<Decimal>) -> Decimal {
    let percentage = discount_percentage.unwrap_or(Decimal::ZERO);
    round_money(price * Decimal::from(quantity) * (Decimal::ONE - percentage))
}

#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderPricing {
    pub line_totals: Vec<Decimal>,
    /// Sum of the undiscounted line amounts.
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    /// Sum of the discounted line totals.
    pub total: Decimal,
}

pub fn subtotal(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(|l| line_total(l.price, l.quantity, None)).sum()
}

pub fn price_order(lines: &[PricedLine], discount_percentage: Option<Decimal>) -> OrderPricing {
    let line_totals: Vec<Decimal> = lines
        .iter()
        .map(|l| line_total(l.price, l.quantity, discount_percentage))
        .collect();
    let subtotal = subtotal(lines);
    let total: Decimal = line_totals.iter().sum();

    OrderPricing {
        line_totals,
        subtotal,
        discount_amount: subtotal - total,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn half_discount_on_two_units() {
        assert_eq!(line_total(dec!(100000), 2, Some(dec!(0.5))), dec!(100000.00));
    }

    #[test]
    fn missing_discount_counts_as_zero() {
        assert_eq!(line_total(dec!(50), 3, None), dec!(150.00));
        assert_eq!(line_total(dec!(50), 3, Some(Decimal::ZERO)), dec!(150.00));
    }

    #[test]
    fn full_discount_is_free() {
        assert_eq!(line_total(dec!(19.99), 7, Some(Decimal::ONE)), Decimal::ZERO);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(round_money(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
    }

    #[test]
    fn large_amounts_round_exactly() {
        assert_eq!(round_money(dec!(100000000)), dec!(100000000));
        assert_eq!(line_total(dec!(100000), 1000, None), dec!(100000000.00));
        assert_eq!(line_total(dec!(100000.004), 100, None), dec!(10000000.40));
        assert_eq!(line_total(dec!(99999999.99), 1000, Some(dec!(0.5))), dec!(49999999995.00));
        assert_eq!(round_money(dec!(123456789012.345)), dec!(123456789012.35));
    }

    #[test]
    fn discount_is_rounded_per_line() {
        // 33.33 * 1 * 0.9 = 29.997 -> 30.00
        assert_eq!(line_total(dec!(33.33), 1, Some(dec!(0.1))), dec!(30.00));
        // 0.15 * 3 * 0.5 = 0.225 -> 0.23
        assert_eq!(line_total(dec!(0.15), 3, Some(dec!(0.5))), dec!(0.23));
    }

    #[test]
    fn formula_holds_over_a_grid() {
        let prices = [dec!(0), dec!(0.01), dec!(9.99), dec!(120.5), dec!(100000), dec!(12345678.91)];
        let quantities = [0, 1, 2, 17, 1000];
        let discounts = [dec!(0), dec!(0.1), dec!(0.25), dec!(0.5), dec!(0.99), dec!(1)];
        for p in prices {
            for q in quantities {
                for d in discounts {
                    let exact = p * Decimal::from(q) * (Decimal::ONE - d);
                    let expected = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                    let got = line_total(p, q, Some(d));
                    assert_eq!(got, expected, "p={p} q={q} d={d}");
                    assert!((got - exact).abs() <= dec!(0.005));
                    assert!(got >= Decimal::ZERO);
                }
            }
        }
    }

    #[test]
    fn order_pricing_sums_lines() {
        let lines = [
            PricedLine { price: dec!(100000), quantity: 2 },
            PricedLine { price: dec!(50), quantity: 3 },
        ];
        let priced = price_order(&lines, Some(dec!(0.5)));
        assert_eq!(priced.line_totals, vec![dec!(100000), dec!(75)]);
        assert_eq!(priced.subtotal, dec!(200150));
        assert_eq!(priced.total, dec!(100075));
        assert_eq!(priced.discount_amount, dec!(100075));
    }

    #[test]
    fn order_without_discount_has_no_discount_amount() {
        let lines = [PricedLine { price: dec!(12.5), quantity: 4 }];
        let priced = price_order(&lines, None);
        assert_eq!(priced.total, dec!(50));
        assert_eq!(priced.subtotal, dec!(50));
        assert_eq!(priced.discount_amount, Decimal::ZERO);
    }

    #[test]
    fn empty_order_is_zero() {
        let priced = price_order(&[], Some(dec!(0.3)));
        assert!(priced.line_totals.is_empty());
        assert_eq!(priced.total, Decimal::ZERO);
    }
}
