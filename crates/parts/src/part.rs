use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventree_core::{DomainError, DomainResult, Entity, PartId};

use crate::price_break::PriceBreaks;

/// A catalog part.
///
/// Supplier parts and BOM lines reference a part by id and live in the
/// catalog next to it; the part itself only carries its own prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub id: PartId,
    pub name: String,
    #[serde(default)]
    pub ipn: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Can be bought from suppliers.
    #[serde(default)]
    pub purchaseable: bool,
    /// Is built from other parts (has a BOM).
    #[serde(default)]
    pub assembly: bool,
    /// Manually maintained internal prices.
    #[serde(default)]
    pub internal_price_breaks: PriceBreaks,
    /// Sale (list) prices.
    #[serde(default)]
    pub sale_price_breaks: PriceBreaks,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl Part {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("part name cannot be empty"));
        }
        Ok(Self {
            id: PartId::new(),
            name,
            ipn: None,
            description: String::new(),
            purchaseable: false,
            assembly: false,
            internal_price_breaks: PriceBreaks::default(),
            sale_price_breaks: PriceBreaks::default(),
            parameters: BTreeMap::new(),
        })
    }

    pub fn with_id(mut self, id: PartId) -> Self {
        self.id = id;
        self
    }

    pub fn with_ipn(mut self, ipn: impl Into<String>) -> Self {
        self.ipn = Some(ipn.into());
        self
    }

    pub fn purchaseable(mut self) -> Self {
        self.purchaseable = true;
        self
    }

    pub fn assembly(mut self) -> Self {
        self.assembly = true;
        self
    }

    pub fn with_internal_price_breaks(mut self, breaks: PriceBreaks) -> Self {
        self.internal_price_breaks = breaks;
        self
    }

    pub fn with_sale_price_breaks(mut self, breaks: PriceBreaks) -> Self {
        self.sale_price_breaks = breaks;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn has_internal_price_breaks(&self) -> bool {
        !self.internal_price_breaks.is_empty()
    }

    /// Internal price for `quantity` units, if internal prices are set.
    pub fn internal_price(&self, quantity: Decimal) -> Option<Decimal> {
        self.internal_price_breaks.total_at(quantity, Decimal::ZERO)
    }

    /// List (sale) price for `quantity` units, if sale prices are set.
    pub fn list_price(&self, quantity: Decimal) -> Option<Decimal> {
        self.sale_price_breaks.total_at(quantity, Decimal::ZERO)
    }

    /// Human-facing label, `IPN | name` when an IPN exists.
    pub fn full_name(&self) -> String {
        match &self.ipn {
            Some(ipn) if !ipn.is_empty() => format!("{ipn} | {}", self.name),
            _ => self.name.clone(),
        }
    }
}

impl Entity for Part {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBreak;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_empty_name() {
        let err = Part::new("  ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn unset_prices_are_absent() {
        let part = Part::new("Resistor").unwrap();
        assert_eq!(part.internal_price(dec!(5)), None);
        assert_eq!(part.list_price(dec!(5)), None);
    }

    #[test]
    fn internal_and_list_prices_scale_with_quantity() {
        let part = Part::new("Widget")
            .unwrap()
            .with_internal_price_breaks(vec![PriceBreak::new(dec!(1), dec!(1.5)).unwrap()].into())
            .with_sale_price_breaks(vec![PriceBreak::new(dec!(1), dec!(4)).unwrap()].into());

        assert_eq!(part.internal_price(dec!(4)), Some(dec!(6)));
        assert_eq!(part.list_price(dec!(4)), Some(dec!(16)));
    }

    #[test]
    fn full_name_prefixes_ipn() {
        let part = Part::new("Widget").unwrap().with_ipn("W-001");
        assert_eq!(part.full_name(), "W-001 | Widget");
    }
}
