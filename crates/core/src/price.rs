//! Decimal price primitives.
//!
//! All money arithmetic is done in `rust_decimal::Decimal`. Prices are only
//! rounded at the presentation edge (`round_price`), never in between.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Number of decimal places reported in pricing output.
pub const PRICE_DECIMAL_PLACES: u32 = 3;

/// Round a price for presentation (3 dp, half-to-even).
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp(PRICE_DECIMAL_PLACES)
}

/// Largest quantity a price is computed for; larger requests are clamped.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Quantities at or below zero are treated as a single unit, and quantities
/// above [`MAX_QUANTITY`] are clamped to it.
pub fn effective_quantity(quantity: Decimal) -> Decimal {
    if quantity <= Decimal::ZERO {
        Decimal::ONE
    } else {
        quantity.min(MAX_QUANTITY)
    }
}

/// Parse a user supplied quantity. Anything unparsable means 1.
pub fn parse_quantity(raw: &str) -> Decimal {
    let raw = raw.trim();
    let parsed = Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw));
    match parsed {
        Ok(q) => effective_quantity(q),
        Err(_) => Decimal::ONE,
    }
}

/// Currency code attached to a pricing request.
///
/// Only a single currency is supported; the code is carried through to the
/// response but never used for conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Currency {}

/// An inclusive (min, max) price pair in a single currency.
///
/// Ranges are request-scoped and never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    /// Build a range; the arguments may be given in either order.
    pub fn new(a: Decimal, b: Decimal) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// A degenerate range where min == max.
    pub fn single(value: Decimal) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn zero() -> Self {
        Self::single(Decimal::ZERO)
    }

    /// Widen to cover both ranges (min of mins, max of maxes).
    pub fn merge(self, other: PriceRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Component-wise sum, or `None` on overflow.
    pub fn checked_add(self, other: PriceRange) -> Option<Self> {
        Some(Self {
            min: self.min.checked_add(other.min)?,
            max: self.max.checked_add(other.max)?,
        })
    }

    /// Multiply both ends by a (non-negative) factor, or `None` on overflow.
    pub fn checked_scale(self, factor: Decimal) -> Option<Self> {
        Some(Self::new(
            self.min.checked_mul(factor)?,
            self.max.checked_mul(factor)?,
        ))
    }

    /// Strip trailing zeros from both ends.
    pub fn normalize(self) -> Self {
        Self {
            min: self.min.normalize(),
            max: self.max.normalize(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.min.is_zero() && self.max.is_zero()
    }
}

impl ValueObject for PriceRange {}

/// Collapse an iterator of prices into the range spanning them.
///
/// Returns `None` for an empty iterator.
pub fn span<I>(prices: I) -> Option<PriceRange>
where
    I: IntoIterator<Item = Decimal>,
{
    prices
        .into_iter()
        .map(PriceRange::single)
        .reduce(PriceRange::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_to_three_places_half_even() {
        assert_eq!(round_price(dec!(1.23449)), dec!(1.234));
        assert_eq!(round_price(dec!(1.2345)), dec!(1.234));
        assert_eq!(round_price(dec!(1.2355)), dec!(1.236));
        assert_eq!(round_price(dec!(22)), dec!(22));
    }

    #[test]
    fn non_positive_quantities_become_one() {
        assert_eq!(effective_quantity(dec!(0)), Decimal::ONE);
        assert_eq!(effective_quantity(dec!(-4.5)), Decimal::ONE);
        assert_eq!(effective_quantity(dec!(2.5)), dec!(2.5));
    }

    #[test]
    fn huge_quantities_are_clamped() {
        assert_eq!(MAX_QUANTITY, dec!(1000000000));
        assert_eq!(parse_quantity("1e28"), MAX_QUANTITY);
        assert_eq!(effective_quantity(Decimal::MAX), MAX_QUANTITY);
        assert_eq!(effective_quantity(MAX_QUANTITY), MAX_QUANTITY);
    }

    #[test]
    fn unparsable_quantity_defaults_to_one() {
        assert_eq!(parse_quantity("abc"), Decimal::ONE);
        assert_eq!(parse_quantity(""), Decimal::ONE);
        assert_eq!(parse_quantity("-3"), Decimal::ONE);
        assert_eq!(parse_quantity(" 12 "), dec!(12));
        assert_eq!(parse_quantity("1e2"), dec!(100));
    }

    #[test]
    fn range_orders_its_bounds() {
        let r = PriceRange::new(dec!(5), dec!(2));
        assert_eq!(r.min, dec!(2));
        assert_eq!(r.max, dec!(5));
    }

    #[test]
    fn merge_and_add() {
        let a = PriceRange::new(dec!(1), dec!(4));
        let b = PriceRange::new(dec!(2), dec!(6));
        assert_eq!(a.merge(b), PriceRange::new(dec!(1), dec!(6)));
        assert_eq!(a.checked_add(b), Some(PriceRange::new(dec!(3), dec!(10))));
    }

    #[test]
    fn overflowing_range_arithmetic_is_none() {
        let huge = PriceRange::single(Decimal::MAX);
        assert_eq!(huge.checked_add(PriceRange::single(dec!(1))), None);
        assert_eq!(huge.checked_scale(dec!(2)), None);
        assert_eq!(
            PriceRange::new(dec!(1), dec!(2)).checked_scale(dec!(3)),
            Some(PriceRange::new(dec!(3), dec!(6)))
        );
    }

    #[test]
    fn span_of_nothing_is_none() {
        assert_eq!(span(Vec::new()), None);
        assert_eq!(
            span(vec![dec!(3), dec!(1), dec!(2)]),
            Some(PriceRange::new(dec!(1), dec!(3)))
        );
    }

    #[test]
    fn currency_codes_are_uppercased() {
        assert_eq!(Currency::new("usd").code(), "USD");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the effective quantity is always strictly positive.
            #[test]
            fn effective_quantity_is_positive(mantissa in -1_000_000i64..1_000_000, scale in 0u32..6) {
                let q = Decimal::new(mantissa, scale);
                let eq = effective_quantity(q);
                prop_assert!(eq > Decimal::ZERO);
                if q <= Decimal::ZERO {
                    prop_assert_eq!(eq, Decimal::ONE);
                } else {
                    prop_assert_eq!(eq, q);
                }
            }
        }
    }
}
