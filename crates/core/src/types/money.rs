//! Money arithmetic for catalog and order pricing.
//!
//! All prices are fixed-point decimals with two fractional digits. The
//! stored catalog price is tax-exclusive; the display price adds 9% VAT.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tax-inclusive display price for a stored base price.
///
/// The base price is multiplied by 1.09 and rounded to two decimal
/// places, midpoints away from zero.
#[must_use]
pub fn price_after_tax(base: Decimal) -> Decimal {
    (base * Decimal::new(109, 2)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Total for a single line: unit price × quantity.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum of line totals over `(unit_price, quantity)` pairs.
#[must_use]
pub fn total(lines: impl IntoIterator<Item = (Decimal, i32)>) -> Decimal {
    lines
        .into_iter()
        .map(|(unit_price, quantity)| line_total(unit_price, quantity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(mantissa: i64, scale: u32) -> Decimal {
        Decimal::new(mantissa, scale)
    }

    #[test]
    fn after_tax_adds_nine_percent() {
        assert_eq!(price_after_tax(dec(10_00, 2)), dec(10_90, 2));
        assert_eq!(price_after_tax(dec(5_00, 2)), dec(5_45, 2));
    }

    #[test]
    fn after_tax_rounds_to_two_places() {
        // 9.99 * 1.09 = 10.8891
        assert_eq!(price_after_tax(dec(9_99, 2)), dec(10_89, 2));
    }

    #[test]
    fn after_tax_rounds_midpoints_away_from_zero() {
        // 4.50 * 1.09 = 4.905, which must round up, not to even
        assert_eq!(price_after_tax(dec(4_50, 2)), dec(4_91, 2));
    }

    #[test]
    fn after_tax_keeps_two_digit_scale() {
        assert_eq!(price_after_tax(dec(10_00, 2)).to_string(), "10.90");
    }

    #[test]
    fn after_tax_of_zero_is_zero() {
        assert_eq!(price_after_tax(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn line_total_multiplies_by_quantity() {
        assert_eq!(line_total(dec(3_25, 2), 4), dec(13_00, 2));
    }

    #[test]
    fn total_sums_all_lines() {
        // 2 × 10.00 + 1 × 5.00 = 25.00
        let lines = [(dec(10_00, 2), 2), (dec(5_00, 2), 1)];
        assert_eq!(total(lines), dec(25_00, 2));
    }

    #[test]
    fn total_of_no_lines_is_zero() {
        assert_eq!(total([]), Decimal::ZERO);
    }
}
