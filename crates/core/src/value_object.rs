//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**.
///
/// - **Value Object**: `PriceRange { min: 2.000, max: 5.000 }`, a price break
/// - **Entity**: `Part { id: PartId(...), name: "..." }`
///
/// To "modify" a value object, build a new one (`PriceRange::merge` returns a
/// fresh range rather than widening in place).
///
/// ```ignore
/// use rust_decimal_macros::dec;
///
/// let a = PriceRange::new(dec!(1), dec!(2));
/// let b = PriceRange::new(dec!(2), dec!(1));
/// assert_eq!(a, b);  // Equal by value, not identity
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
