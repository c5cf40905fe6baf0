//! Quantity price breaks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventree_core::{DomainError, DomainResult, ValueObject};

/// A unit price that applies from `quantity` upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreak {
    pub quantity: Decimal,
    pub price: Decimal,
}

impl PriceBreak {
    pub fn new(quantity: Decimal, price: Decimal) -> DomainResult<Self> {
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation("price break quantity must be positive"));
        }
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price break price cannot be negative"));
        }
        Ok(Self { quantity, price })
    }
}

impl ValueObject for PriceBreak {}

/// A schedule of price breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceBreaks(Vec<PriceBreak>);

impl PriceBreaks {
    pub fn new(breaks: Vec<PriceBreak>) -> DomainResult<Self> {
        for pb in &breaks {
            PriceBreak::new(pb.quantity, pb.price)?;
        }
        Ok(Self(breaks))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceBreak> {
        self.0.iter()
    }

    /// Unit price applicable at `quantity`.
    ///
    /// The break with the largest threshold not above `quantity` wins. Below
    /// every threshold the smallest break is used. No breaks means no price.
    pub fn unit_price_at(&self, quantity: Decimal) -> Option<Decimal> {
        let applicable = self
            .0
            .iter()
            .filter(|pb| pb.quantity <= quantity)
            .max_by(|a, b| a.quantity.cmp(&b.quantity));

        applicable
            .or_else(|| self.0.iter().min_by(|a, b| a.quantity.cmp(&b.quantity)))
            .map(|pb| pb.price)
    }

    /// Total price for `quantity` units, plus a fixed `base_cost`.
    ///
    /// `None` when there is no price or the total does not fit a `Decimal`.
    pub fn total_at(&self, quantity: Decimal, base_cost: Decimal) -> Option<Decimal> {
        let unit = self.unit_price_at(quantity)?;
        let total = unit.checked_mul(quantity)?.checked_add(base_cost)?;
        Some(total.normalize())
    }
}

impl From<Vec<PriceBreak>> for PriceBreaks {
    fn from(value: Vec<PriceBreak>) -> Self {
        Self(value)
    }
}
