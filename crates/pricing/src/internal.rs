//! Manually configured prices.

use rust_decimal::Decimal;

use inventree_parts::Part;

/// Internal price of `quantity` units, or `None` if no internal price is set.
pub fn internal_price(part: &Part, quantity: Decimal) -> Option<Decimal> {
    part.internal_price(quantity)
}

/// List (sale) price of `quantity` units, or `None` if no sale price is set.
pub fn list_price(part: &Part, quantity: Decimal) -> Option<Decimal> {
    part.list_price(quantity)
}
